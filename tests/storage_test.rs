use image_shamir::{
    FileShareStore, ImageShamir, PixelGrid, ShamirError, ShareStore, validate_compatible,
};
use tempfile::tempdir;

#[test]
fn test_split_store_load_reconstruct() {
    let dir = tempdir().unwrap();
    let mut store = FileShareStore::new(dir.path()).unwrap();

    let pixels: Vec<u64> = (0..48).map(|i| (i * 5) % 256).collect();
    let image = PixelGrid::rgb(4, 4, pixels).unwrap();
    let mut scheme = ImageShamir::builder(5, 3)
        .with_prime(257)
        .with_seed([11u8; 32])
        .build()
        .unwrap();

    for share in scheme.split(&image).unwrap() {
        store.store_share(&share).unwrap();
    }
    assert_eq!(store.list_shares().unwrap(), vec![1, 2, 3, 4, 5]);

    let loaded = vec![
        store.load_share(5).unwrap(),
        store.load_share(1).unwrap(),
        store.load_share(3).unwrap(),
    ];
    validate_compatible(&loaded).unwrap();

    let restored = ImageShamir::reconstruct(&loaded).unwrap();
    assert_eq!(restored, image);
}

#[test]
fn test_metadata_roundtrip_is_exact() {
    let dir = tempdir().unwrap();
    let mut store = FileShareStore::new(dir.path()).unwrap();

    // 16-bit field: share values above 255 must survive the container
    let image = PixelGrid::grayscale(3, 2, vec![65535, 0, 1, 40000, 2, 3]).unwrap();
    let mut scheme = ImageShamir::builder(3, 2)
        .with_prime(65537)
        .with_seed([12u8; 32])
        .build()
        .unwrap();
    let shares = scheme.split(&image).unwrap();

    for share in &shares {
        store.store_share(share).unwrap();
    }

    for share in &shares {
        let loaded = store.load_share(share.x).unwrap();
        assert_eq!(loaded.x, share.x);
        assert_eq!(loaded.prime, 65537);
        assert_eq!(loaded.mode, share.mode);
        assert_eq!(loaded.shape(), (3, 2));
        assert_eq!(loaded.threshold, 2);
        assert_eq!(loaded.data, share.data);
    }
}

#[test]
fn test_load_missing_share() {
    let dir = tempdir().unwrap();
    let store = FileShareStore::new(dir.path()).unwrap();

    assert!(matches!(
        store.load_share(1),
        Err(ShamirError::InvalidShareIndex(1))
    ));
}

#[test]
fn test_foreign_files_are_ignored_by_listing() {
    let dir = tempdir().unwrap();
    let mut store = FileShareStore::new(dir.path()).unwrap();

    let image = PixelGrid::grayscale(1, 1, vec![5]).unwrap();
    let mut scheme = ImageShamir::builder(2, 2)
        .with_prime(257)
        .with_seed([13u8; 32])
        .build()
        .unwrap();
    for share in scheme.split(&image).unwrap() {
        store.store_share(&share).unwrap();
    }

    std::fs::write(dir.path().join("notes.txt"), b"not a share").unwrap();
    std::fs::write(dir.path().join("share_abc"), b"not a share either").unwrap();

    assert_eq!(store.list_shares().unwrap(), vec![1, 2]);
}

#[test]
fn test_corrupt_container_is_rejected() {
    let dir = tempdir().unwrap();
    let store = FileShareStore::new(dir.path()).unwrap();

    std::fs::write(dir.path().join("share_001"), b"JPEGnot-a-share-at-all").unwrap();
    assert!(matches!(
        store.load_share(1),
        Err(ShamirError::InvalidShareFormat)
    ));
}
