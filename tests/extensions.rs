use anyhow::Result;
use jstream::extensions::CompositeTransform;
use jstream::*;

// A hand-written stage plugged in through `from_stage`
struct ReversedWords {
    upstream: Jstream<String>,
}

impl Stage<String> for ReversedWords {
    fn name(&self) -> &'static str {
        "reversed_words"
    }

    fn open(&self) -> Pull<String> {
        Box::new(
            self.upstream
                .iter()
                .map(|item| item.map(|s| s.chars().rev().collect())),
        )
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.non_iterated_count()
    }
}

#[test]
fn custom_stage() -> Result<()> {
    let words = Jstream::of(vec!["hello".to_string(), "world".to_string()]);
    let reversed = Jstream::from_stage(ReversedWords { upstream: words }, Properties::default());

    assert_eq!(reversed.non_iterated_count(), Some(2));
    assert_eq!(reversed.to_vec()?, vec!["olleh", "dlrow"]);
    assert_eq!(reversed.map(|s| s.len()).to_vec()?, vec![5, 5]);
    Ok(())
}

struct CleanWords;

impl CompositeTransform<String, String> for CleanWords {
    fn expand(&self, input: Jstream<String>) -> Jstream<String> {
        input
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unique()
    }
}

struct WordLengths {
    min: usize,
}

impl CompositeTransform<String, (String, usize)> for WordLengths {
    fn expand(&self, input: Jstream<String>) -> Jstream<(String, usize)> {
        let min = self.min;
        input
            .map(|w| {
                let len = w.len();
                (w, len)
            })
            .filter(move |p| p.1 >= min)
    }
}

#[test]
fn composite_transforms_compose() -> Result<()> {
    let raw = Jstream::of(vec![
        "  Rust ".to_string(),
        String::new(),
        "rust".to_string(),
        "Go".to_string(),
        "Haskell".to_string(),
    ]);

    let clean = raw.apply_composite(&CleanWords);
    assert_eq!(clean.to_vec()?, vec!["rust", "go", "haskell"]);

    let long = clean.apply_composite(&WordLengths { min: 3 });
    assert_eq!(
        long.to_vec()?,
        vec![("rust".to_string(), 4), ("haskell".to_string(), 7)]
    );
    Ok(())
}

#[test]
fn pipe_hands_the_stage_to_a_function() -> Result<()> {
    fn top_two(s: Jstream<i32>) -> Result<Vec<i32>> {
        s.max_n(2, Order::natural())
    }

    let best = Jstream::of(vec![4, 9, 1, 7]).pipe(top_two)?;
    assert_eq!(best, vec![9, 7]);

    let described = Jstream::of(vec![1, 2]).pipe(|s| s.make_string("+"))?;
    assert_eq!(described, "1+2");
    Ok(())
}
