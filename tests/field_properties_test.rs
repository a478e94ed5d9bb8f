use image_shamir::{ShamirError, is_prime, lagrange_coeffs_at_zero, mod_inverse, next_prime};

#[test]
fn test_inverse_product_is_one_for_every_residue() {
    for p in [3u64, 5, 7, 251, 257, 65537] {
        let limit = p.min(1000);
        for a in 1..limit {
            let inv = mod_inverse(a, p).unwrap();
            assert_eq!((a * inv) % p, 1, "a={a}, p={p}");
        }
    }
}

#[test]
fn test_inverse_is_an_involution() {
    for p in [5u64, 257, 1009] {
        for a in 1..p.min(500) {
            let inv = mod_inverse(a, p).unwrap();
            assert_eq!(mod_inverse(inv, p).unwrap(), a);
        }
    }
}

#[test]
fn test_inverse_of_zero_is_rejected() {
    for p in [2u64, 257, 65537] {
        assert!(matches!(
            mod_inverse(0, p),
            Err(ShamirError::NoInverse { value: 0, .. })
        ));
        assert!(mod_inverse(p, p).is_err());
        assert!(mod_inverse(p * 7, p).is_err());
    }
}

#[test]
fn test_next_prime_leaves_no_gap() {
    for n in 2..2000u64 {
        let p = next_prime(n);
        assert!(p > n);
        assert!(is_prime(p));
        for between in (n + 1)..p {
            assert!(!is_prime(between), "missed prime {between} after {n}");
        }
    }
}

#[test]
fn test_pixel_range_primes() {
    // The fields that matter in practice: just above the 4-, 8- and 16-bit
    // pixel ranges
    assert_eq!(next_prime(15), 17);
    assert_eq!(next_prime(255), 257);
    assert_eq!(next_prime(4095), 4099);
    assert_eq!(next_prime(65535), 65537);
}

#[test]
fn test_lagrange_collapses_polynomial_points() {
    // f(x) = 42 + 17x + 5x^2 over GF(257); any three points recover f(0)
    let p = 257u64;
    let f = |x: u64| (42 + 17 * x + 5 * x * x) % p;

    for xs in [[1u64, 2, 3], [2, 4, 5], [1, 3, 5], [5, 2, 1]] {
        let coeffs = lagrange_coeffs_at_zero(&xs, p).unwrap();
        let secret = xs
            .iter()
            .zip(&coeffs)
            .fold(0u64, |acc, (&x, &li)| (acc + f(x) * li) % p);
        assert_eq!(secret, 42, "xs={xs:?}");
    }
}

#[test]
fn test_lagrange_with_more_points_than_degree() {
    // Four points on a degree-1 polynomial still collapse to the constant
    let p = 257u64;
    let f = |x: u64| (9 + 100 * x) % p;

    let xs = [1u64, 2, 3, 4];
    let coeffs = lagrange_coeffs_at_zero(&xs, p).unwrap();
    let secret = xs
        .iter()
        .zip(&coeffs)
        .fold(0u64, |acc, (&x, &li)| (acc + f(x) * li) % p);
    assert_eq!(secret, 9);
}

#[test]
fn test_lagrange_degenerate_coordinates() {
    assert!(matches!(
        lagrange_coeffs_at_zero(&[2, 2], 257),
        Err(ShamirError::NoInverse { .. })
    ));
    assert!(lagrange_coeffs_at_zero(&[0, 3], 257).is_err());
}
