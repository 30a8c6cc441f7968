use crate::hamiltonian::Mpo;
use tn::mps::{C64, MPS};

/// `⟨ψ|W|ψ⟩` contracted left to right. The environment carries the legs
/// `(bra bond, MPO bond, ket bond)`.
pub(crate) fn mpo_sandwich(psi: &MPS, mpo: &Mpo) -> C64 {
    assert_eq!(psi.len(), mpo.len(), "MPS/MPO length mismatch");

    let mut env = vec![C64::new(1.0, 0.0)];
    let (mut da, mut dw) = (1usize, 1usize);

    for (a, w) in psi.sites.iter().zip(mpo.sites.iter()) {
        assert!(
            w.dout == a.dp && w.din == a.dp,
            "MPO site does not match physical dimension {}",
            a.dp
        );
        let db = a.dl;

        // bra: t1[w, b, p, a'] = Σ_a env[a, w, b] conj(A[a, p, a'])
        let mut t1 = vec![C64::new(0.0, 0.0); dw * db * a.dp * a.dr];
        for ia in 0..da {
            for iw in 0..dw {
                for ib in 0..db {
                    let e = env[(ia * dw + iw) * db + ib];
                    if e == C64::new(0.0, 0.0) {
                        continue;
                    }
                    for p in 0..a.dp {
                        for ra in 0..a.dr {
                            t1[((iw * db + ib) * a.dp + p) * a.dr + ra] += e * a.get(ia, p, ra).conj();
                        }
                    }
                }
            }
        }

        // operator: t2[b, a', w', q] = Σ_{w,p} t1[w, b, p, a'] W[w, p, q, w']
        let mut t2 = vec![C64::new(0.0, 0.0); db * a.dr * w.dr * a.dp];
        for iw in 0..dw {
            for ib in 0..db {
                for p in 0..a.dp {
                    for ra in 0..a.dr {
                        let x = t1[((iw * db + ib) * a.dp + p) * a.dr + ra];
                        if x == C64::new(0.0, 0.0) {
                            continue;
                        }
                        for q in 0..a.dp {
                            for rw in 0..w.dr {
                                t2[((ib * a.dr + ra) * w.dr + rw) * a.dp + q] += x * w.get(iw, p, q, rw);
                            }
                        }
                    }
                }
            }
        }

        // ket: next[a', w', b'] = Σ_{b,q} t2[b, a', w', q] A[b, q, b']
        let mut next = vec![C64::new(0.0, 0.0); a.dr * w.dr * a.dr];
        for ib in 0..db {
            for ra in 0..a.dr {
                for rw in 0..w.dr {
                    for q in 0..a.dp {
                        let x = t2[((ib * a.dr + ra) * w.dr + rw) * a.dp + q];
                        if x == C64::new(0.0, 0.0) {
                            continue;
                        }
                        for rb in 0..a.dr {
                            next[(ra * w.dr + rw) * a.dr + rb] += x * a.get(ib, q, rb);
                        }
                    }
                }
            }
        }

        env = next;
        da = a.dr;
        dw = w.dr;
    }

    env.into_iter().fold(C64::new(0.0, 0.0), |a, b| a + b)
}
