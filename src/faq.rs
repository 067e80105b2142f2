//! Keyword-scored FAQ lookup backing the help bubble.

const KEYWORD_SCORE: u32 = 3;
const QUESTION_SCORE: u32 = 1;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "can", "do", "does", "for", "how", "i", "in", "is", "it", "my", "of",
    "on", "or", "the", "to", "what", "when", "where", "which", "who", "why", "with", "you",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    pub keywords: Vec<String>,
}

impl FaqEntry {
    pub fn new(question: &str, answer: &str, keywords: &[&str]) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaqMatch<'a> {
    pub entry: &'a FaqEntry,
    pub score: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FaqIndex {
    entries: Vec<FaqEntry>,
}

impl FaqIndex {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Entries with a positive score, best first. Equal scores keep entry
    /// order.
    pub fn search(&self, query: &str) -> Vec<FaqMatch<'_>> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }
        let mut matches: Vec<FaqMatch<'_>> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let score = score_entry(entry, &tokens);
                (score > 0).then_some(FaqMatch { entry, score })
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }

    pub fn best_match(&self, query: &str) -> Option<&FaqEntry> {
        self.search(query).first().map(|m| m.entry)
    }

    /// The questions users ask about the event app.
    pub fn default_entries() -> Self {
        Self::new(vec![
            FaqEntry::new(
                "How does the mood quiz work?",
                "Answer five quick questions and we match your mood to event categories. Retake it any time from the home screen.",
                &["quiz", "mood", "match", "questions", "retake"],
            ),
            FaqEntry::new(
                "How do I bookmark an event?",
                "Press the bookmark icon on any event card. Bookmarked events show up under Saved and drive the countdown pill.",
                &["bookmark", "save", "saved", "favorite", "countdown"],
            ),
            FaqEntry::new(
                "How do I RSVP?",
                "Open the event and press RSVP. Free events confirm instantly; paid events ask for card details first.",
                &["rsvp", "attend", "going", "register", "ticket"],
            ),
            FaqEntry::new(
                "Is my payment secure?",
                "Card details go straight to the payment processor and never touch our servers. You get a receipt by email.",
                &["payment", "pay", "card", "secure", "refund", "receipt", "stripe"],
            ),
            FaqEntry::new(
                "How do event forums work?",
                "Each event has its own discussion board. Post, reply to any comment and upvote the ones you like. Posts expire after 30 days.",
                &["forum", "post", "reply", "upvote", "discussion", "comment"],
            ),
            FaqEntry::new(
                "How do I change my account settings?",
                "Open Settings to update your display name, email, password or notification preferences.",
                &["account", "settings", "password", "email", "profile", "name"],
            ),
            FaqEntry::new(
                "Where do the events come from?",
                "Events are pulled from public listings near your location and filtered by your quiz results.",
                &["events", "source", "location", "near", "filter", "listings"],
            ),
        ])
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= 2 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

fn score_entry(entry: &FaqEntry, tokens: &[String]) -> u32 {
    let question = entry.question.to_lowercase();
    tokens
        .iter()
        .map(|token| {
            let mut score = 0;
            if entry.keywords.iter().any(|k| k == token) {
                score += KEYWORD_SCORE;
            }
            if question.contains(token.as_str()) {
                score += QUESTION_SCORE;
            }
            score
        })
        .sum()
}
