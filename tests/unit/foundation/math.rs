use super::*;

#[test]
fn fnv_incremental_writes_match_one_shot() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"cardreel");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"card");
    b.write_bytes(b"reel");
    assert_eq!(a.finish(), b.finish());
    assert_ne!(a.finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn stable_pick_is_deterministic_and_in_range() {
    assert_eq!(stable_pick("Dark Magician", 0), None);
    let first = stable_pick("Dark Magician", 5).unwrap();
    assert!(first < 5);
    assert_eq!(stable_pick("Dark Magician", 5), Some(first));
}

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(0.4, 0.7, 0.0), 0.4);
    assert!((lerp(0.4, 0.7, 1.0) - 0.7).abs() < 1e-12);
}
