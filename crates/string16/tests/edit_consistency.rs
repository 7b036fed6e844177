//! Randomized editing against a reference model.
//!
//! The reference is a plain list of clusters. Every edit is expressed as offset expressions
//! counted in clusters, applied to both, and the decoded buffer must always equal the
//! concatenated reference.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use string16::{Indexer, OffsetExpression as At, String16};

/// Single clusters that never merge with a neighbour when placed side by side.
const CLUSTERS: &[&str] = &["X", "你", "👋", "e\u{301}", "👍🏽", "ß", " "];

fn cluster_offset(clusters: usize) -> i64 {
    i64::try_from(clusters).unwrap()
}

#[test]
fn test_random_edits_match_reference() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut indexer = Indexer::default();
    let mut buffer = String16::new();
    let mut reference: Vec<&str> = Vec::new();

    for _ in 0..400 {
        let len = reference.len();
        match rng.gen_range(0..4) {
            0 | 1 => {
                let at = rng.gen_range(0..=len);
                let piece = CLUSTERS[rng.gen_range(0..CLUSTERS.len())];
                indexer.insert(&mut buffer, &At::start().offset(cluster_offset(at)), piece);
                reference.insert(at, piece);
            }
            2 if len > 0 => {
                let from = rng.gen_range(0..len);
                let to = rng.gen_range(from..=len.min(from + 3));
                indexer.remove(
                    &mut buffer,
                    At::start().offset(cluster_offset(from))
                        ..At::start().offset(cluster_offset(to)),
                );
                reference.drain(from..to);
            }
            _ => {
                // Replace one cluster, or append when aimed at the end.
                let at = rng.gen_range(0..=len);
                let piece = CLUSTERS[rng.gen_range(0..CLUSTERS.len())];
                indexer.set_char_at(
                    &mut buffer,
                    &At::end().offset(-cluster_offset(len - at)),
                    piece,
                );
                if at == len {
                    reference.push(piece);
                } else {
                    reference[at] = piece;
                }
            }
        }

        assert_eq!(buffer.to_string_lossy(), reference.concat());
        assert_eq!(indexer.grapheme_count(&buffer), reference.len());
    }
}

#[test]
fn test_every_cluster_is_readable() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut indexer = Indexer::default();
    let reference: Vec<&str> = (0..200)
        .map(|_| CLUSTERS[rng.gen_range(0..CLUSTERS.len())])
        .collect();
    let buffer = String16::from(reference.concat());

    let forward: Vec<String> = indexer.graphemes(&buffer).collect();
    assert_eq!(forward, reference);

    for (i, expected) in reference.iter().enumerate() {
        let at = At::start().offset(cluster_offset(i));
        assert_eq!(indexer.char_at(&buffer, &at), *expected);
    }

    let reversed: Vec<String> = indexer
        .ranges_rev(&buffer)
        .map(|range| buffer.decode_range(range.start.offset()..range.end.offset()))
        .collect();
    let mut expected: Vec<&str> = reference.clone();
    expected.reverse();
    assert_eq!(reversed, expected);
}
