/// Synonym groups mapped to the canonical category used by the store. Entries
/// are evaluated in order and the first group containing the input wins.
pub const CATEGORY_SYNONYMS: &[(&[&str], &str)] = &[
    (&["laptops", "notebooks"], "Ноутбуки"),
    (&["smartphones", "phones"], "Смартфони"),
    (&["audio", "headphones"], "Аудіотехніка"),
    (&["tablets"], "Планшети"),
    (&["wearables"], "Носимі пристрої"),
];

/// Maps a free-text category onto its canonical name, matching
/// case-insensitively. Unknown categories are returned unchanged.
pub fn normalize_category(category: &str) -> String {
    let lowered = category.to_lowercase();
    CATEGORY_SYNONYMS
        .iter()
        .find(|(synonyms, _)| synonyms.contains(&lowered.as_str()))
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| category.to_string())
}
