/// Indoor-scene keywords matched as substrings of the caption.
pub const INTERIOR_KEYWORDS: [&str; 10] = [
    "room", "hallway", "corridor", "wall", "ceiling", "floor", "interior", "inside", "door",
    "window",
];

/// Number of distinct indoor keywords occurring in `caption`.
pub fn interior_hits(caption: &str) -> usize {
    let c = caption.to_lowercase();
    INTERIOR_KEYWORDS.iter().filter(|k| c.contains(*k)).count()
}

/// True if the caption reads like an interior scene.
pub fn likely_interior(caption: &str, min_hits: usize) -> bool {
    interior_hits(caption) >= min_hits
}
