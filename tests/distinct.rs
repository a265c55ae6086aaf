use anyhow::Result;
use jstream::testing::*;
use jstream::*;

#[test]
fn unique_keeps_first_occurrences_in_order() -> Result<()> {
    let items = Jstream::of(vec![3, 1, 3, 2, 1, 4]);
    assert_collections_equal(&items.unique(), &[3, 1, 2, 4])
}

#[test]
fn unique_by_derived_identity() -> Result<()> {
    let words = Jstream::of(vec!["Apple", "apple", "Pear", "PEAR", "fig"]);
    let folded = words.unique_by(|w| w.to_lowercase());
    assert_collections_equal(&folded, &["Apple", "Pear", "fig"])
}

#[test]
fn unique_state_resets_between_iterations() -> Result<()> {
    let deduped = Jstream::of(vec!['a', 'b', 'a']).unique();
    assert_eq!(deduped.to_vec()?, vec!['a', 'b']);
    assert_eq!(deduped.to_vec()?, vec!['a', 'b']);
    Ok(())
}

#[test]
fn unique_stays_lazy_on_infinite_input() -> Result<()> {
    let cycled = Jstream::generate(|i| i % 3).unique();
    assert!(cycled.properties().infinite.is_true());
    assert_eq!(cycled.take(3).to_vec()?, vec![0, 1, 2]);
    Ok(())
}
