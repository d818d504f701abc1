use std::collections::HashSet;
use std::sync::OnceLock;

/// Punctuation stripped from both ends of a token before lookup.
const TRIM_CHARS: &[char] = &['.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}', '\'', '"'];

const BLOCKED_WORDS: &[&str] = &[
    // profanity
    "fuck", "shit", "bitch", "ass", "dick", "cock", "pussy", "cunt", "whore", "slut",
    "bastard", "motherfucker", "fucker", "dumbass", "idiot", "stupid",
    "amk", "aq", "orospu", "piç", "göt", "siktir", "amına", "ananı", "babani",
    "koyayım", "koyim", "yavşak", "pezevenk", "ibne", "kaltak", "sürtük", "fahişe",
    "kancık",
    // violence
    "kill", "murder", "explode", "shoot", "gun", "knife", "weapon", "terrorist",
    "öldür", "öldürmek", "katlet", "katliam", "bomba", "patlat", "vur", "çek", "silah", "bıçak",
    "bıçakla", "terörist",
    // harassment
    "harass", "threaten", "blackmail", "force", "rape",
    "taciz", "rahatsız", "zorla", "tehdit", "şantaj",
    // spam
    "bitcoin", "crypto", "lottery", "winner", "prize", "discount", "free", "money",
    "kripto", "indirim", "kazan", "para", "dolar",
    // explicit
    "porn", "sex", "nude", "naked", "penis", "masturbation",
    "seks", "çıplak", "vajina", "mastürbasyon",
];

static BLOCK_LIST: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn block_list() -> &'static HashSet<&'static str> {
    BLOCK_LIST.get_or_init(|| BLOCKED_WORDS.iter().copied().collect())
}

/// Keyword content filter for chat messages.
///
/// The text is lower-cased and split on whitespace; each token loses
/// surrounding punctuation and is looked up in a fixed block-list. Returns
/// `false` as soon as one token is blocked.
pub fn is_safe(text: &str) -> bool {
    let blocked = block_list();
    let lowered = text.to_lowercase();

    let hit = lowered
        .split_whitespace()
        .map(|token| token.trim_matches(TRIM_CHARS))
        .find(|token| blocked.contains(token));

    if let Some(token) = hit {
        tracing::debug!("Message rejected by content filter on token '{}'", token);
        return false;
    }
    true
}
