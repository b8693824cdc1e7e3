//! Curated mood categories
//!
//! Each category groups ten references for a mood or life situation. The
//! verses themselves are fetched on demand through the reference cache.

use serde::Serialize;

/// A curated group of verse references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerseCategory {
    /// Unique lower-case identifier, used on the command line
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// References in browsing order
    pub references: &'static [&'static str],
}

impl VerseCategory {
    /// Returns the reference at `index`, clamped to the last one
    ///
    /// Returns `None` only for a category without references.
    pub fn reference_at(&self, index: usize) -> Option<&'static str> {
        let last = self.references.len().checked_sub(1)?;
        self.references.get(index.min(last)).copied()
    }

    /// Human-readable position, e.g. "3 of 10"; `index` is zero-based and clamped
    pub fn progress(&self, index: usize) -> String {
        let total = self.references.len();
        let position = index.min(total.saturating_sub(1)) + 1;
        format!("{} of {}", position.min(total), total)
    }
}

/// Static array of all categories
pub static CATEGORIES: [VerseCategory; 10] = [
    VerseCategory {
        id: "comfort",
        name: "Comfort",
        description: "When you need reassurance",
        references: &[
            "Psalm 23:4",
            "Psalm 34:18",
            "Isaiah 41:10",
            "Isaiah 43:2",
            "Matthew 5:4",
            "Matthew 11:28-30",
            "2 Corinthians 1:3-4",
            "Romans 8:28",
            "Psalm 147:3",
            "Revelation 21:4",
        ],
    },
    VerseCategory {
        id: "peace",
        name: "Peace",
        description: "For a calm and quiet spirit",
        references: &[
            "John 14:27",
            "Philippians 4:6-7",
            "Isaiah 26:3",
            "Psalm 46:10",
            "Colossians 3:15",
            "Romans 15:13",
            "Numbers 6:24-26",
            "Psalm 4:8",
            "Isaiah 32:17",
            "2 Thessalonians 3:16",
        ],
    },
    VerseCategory {
        id: "hope",
        name: "Hope",
        description: "Light in difficult times",
        references: &[
            "Jeremiah 29:11",
            "Romans 15:13",
            "Romans 8:24-25",
            "Hebrews 11:1",
            "Psalm 42:11",
            "Lamentations 3:22-23",
            "Isaiah 40:31",
            "Psalm 130:5",
            "1 Peter 1:3",
            "Romans 5:3-5",
        ],
    },
    VerseCategory {
        id: "courage",
        name: "Courage",
        description: "Strength to face your fears",
        references: &[
            "Joshua 1:9",
            "Deuteronomy 31:6",
            "Isaiah 41:13",
            "Psalm 27:1",
            "2 Timothy 1:7",
            "Isaiah 43:1",
            "Psalm 56:3-4",
            "Proverbs 28:1",
            "1 Corinthians 16:13",
            "Ephesians 6:10",
        ],
    },
    VerseCategory {
        id: "love",
        name: "Love",
        description: "God's unconditional love",
        references: &[
            "1 Corinthians 13:4-7",
            "John 3:16",
            "Romans 8:38-39",
            "1 John 4:7-8",
            "1 John 4:19",
            "Ephesians 3:17-19",
            "Psalm 136:1",
            "Zephaniah 3:17",
            "John 15:12-13",
            "Romans 5:8",
        ],
    },
    VerseCategory {
        id: "strength",
        name: "Strength",
        description: "When you feel overwhelmed",
        references: &[
            "Philippians 4:13",
            "Isaiah 40:29",
            "Psalm 73:26",
            "2 Corinthians 12:9-10",
            "Nehemiah 8:10",
            "Psalm 18:32",
            "Ephesians 3:16",
            "Psalm 28:7",
            "Isaiah 41:10",
            "Habakkuk 3:19",
        ],
    },
    VerseCategory {
        id: "anxiety",
        name: "Anxiety & Fear",
        description: "Release your worries",
        references: &[
            "1 Peter 5:7",
            "Philippians 4:6-7",
            "Matthew 6:25-27",
            "Psalm 55:22",
            "Isaiah 41:10",
            "Psalm 94:19",
            "Matthew 6:34",
            "Deuteronomy 31:8",
            "Psalm 23:4",
            "Luke 12:25-26",
        ],
    },
    VerseCategory {
        id: "gratitude",
        name: "Gratitude",
        description: "Cultivate a thankful heart",
        references: &[
            "1 Thessalonians 5:18",
            "Psalm 107:1",
            "Colossians 3:17",
            "Psalm 100:4-5",
            "Psalm 136:1",
            "James 1:17",
            "Philippians 4:4-6",
            "Psalm 9:1",
            "Ephesians 5:20",
            "Psalm 118:24",
        ],
    },
    VerseCategory {
        id: "wisdom",
        name: "Wisdom",
        description: "Guidance for life's decisions",
        references: &[
            "Proverbs 3:5-6",
            "James 1:5",
            "Proverbs 2:6",
            "Psalm 111:10",
            "Proverbs 4:7",
            "Colossians 2:2-3",
            "Proverbs 16:16",
            "Ecclesiastes 7:12",
            "Proverbs 9:10",
            "Psalm 119:105",
        ],
    },
    VerseCategory {
        id: "forgiveness",
        name: "Forgiveness",
        description: "Grace and new beginnings",
        references: &[
            "1 John 1:9",
            "Ephesians 4:32",
            "Colossians 3:13",
            "Psalm 103:12",
            "Isaiah 1:18",
            "Micah 7:18-19",
            "Acts 3:19",
            "Matthew 6:14-15",
            "Psalm 32:5",
            "2 Chronicles 7:14",
        ],
    },
];

/// Gets a category by its ID
///
/// # Arguments
/// * `id` - The unique identifier of the category (e.g., "peace")
///
/// # Returns
/// * `Some(&VerseCategory)` if a category with the given ID exists
/// * `None` if no category matches the ID
pub fn get_category_by_id(id: &str) -> Option<&'static VerseCategory> {
    CATEGORIES.iter().find(|category| category.id == id)
}

/// Returns all categories as a slice
pub fn all_categories() -> &'static [VerseCategory] {
    &CATEGORIES
}
