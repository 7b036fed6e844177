use string16::{IndexConfig, Indexer, OffsetExpression as At, Predicate, String16};

fn main() {
    // Session opens and failed resolutions are logged at debug level.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let mut indexer = Indexer::new(IndexConfig::default().with_clamp_on_overflow(true));
    let mut text = String16::from("Hello, World!");

    // Insert before the last cluster.
    indexer.insert(&mut text, &At::end().offset(-1), "?");
    println!("{text}");

    // Replace the greeting, up to the first space.
    indexer.set(&mut text, ..At::first_char(' '), "Hi 👋🏽,");
    println!("{text}");

    // The wave with its skin tone is one cluster: one step back from the comma lands on it.
    let wave = At::first_char(',').offset(-1);
    println!("cluster before the comma: {}", indexer.char_at(&text, &wave));

    // Everything after the last word match.
    let word = Predicate::regex(r"\w+").unwrap();
    println!("tail: {}", indexer.get(&text, At::last_trailing(word)..));

    // Out of range positions are absent through the safe entry points.
    println!(
        "past the end: {:?}",
        indexer.safe_char_at(&text, &At::end().offset(1))
    );

    // Clamped stepping saturates at the ends.
    let end = indexer.end_index(&text);
    println!("after the end: {}", indexer.index_after(&text, end));

    for (i, cluster) in indexer.graphemes(&text).enumerate() {
        println!("{i:2}: {cluster:?}");
    }
}
