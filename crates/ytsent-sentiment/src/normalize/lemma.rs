//! Rule-based English lemmatizer.
//!
//! Lookup order: irregular forms, words kept as-is, then suffix rules for
//! plural nouns and `-ed`/`-ing` verb forms. Input must already be lowercase.

/// Irregular inflections mapped to their dictionary form.
const IRREGULAR: &[(&str, &str)] = &[
    ("n't", "not"),
    ("n\u{2019}t", "not"),
    ("ca", "can"),
    ("wo", "will"),
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("goes", "go"),
    ("went", "go"),
    ("gone", "go"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("using", "use"),
    ("used", "use"),
    ("made", "make"),
    ("said", "say"),
    ("got", "get"),
    ("gotten", "get"),
    ("saw", "see"),
    ("seen", "see"),
    ("took", "take"),
    ("taken", "take"),
    ("came", "come"),
    ("gave", "give"),
    ("given", "give"),
    ("knew", "know"),
    ("known", "know"),
    ("thought", "think"),
    ("told", "tell"),
    ("found", "find"),
    ("felt", "feel"),
    ("left", "leave"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("ran", "run"),
    ("sang", "sing"),
    ("sung", "sing"),
    ("wrote", "write"),
    ("written", "write"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("heard", "hear"),
    ("kept", "keep"),
    ("lost", "lose"),
    ("meant", "mean"),
    ("met", "meet"),
    ("paid", "pay"),
    ("sat", "sit"),
    ("sold", "sell"),
    ("sent", "send"),
    ("spent", "spend"),
    ("stood", "stand"),
    ("understood", "understand"),
    ("won", "win"),
    ("began", "begin"),
    ("begun", "begin"),
    ("broke", "break"),
    ("broken", "break"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("held", "hold"),
    ("hidden", "hide"),
    ("led", "lead"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("stole", "steal"),
    ("stolen", "steal"),
    ("taught", "teach"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("wore", "wear"),
    ("worn", "wear"),
    ("built", "build"),
    ("caught", "catch"),
    ("fought", "fight"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("slept", "sleep"),
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
    ("bigger", "big"),
    ("biggest", "big"),
    ("greater", "great"),
    ("greatest", "great"),
    ("funnier", "funny"),
    ("funniest", "funny"),
    ("happier", "happy"),
    ("happiest", "happy"),
    ("easier", "easy"),
    ("easiest", "easy"),
    ("nicer", "nice"),
    ("nicest", "nice"),
    ("cutest", "cute"),
    ("prettiest", "pretty"),
    ("sweetest", "sweet"),
    ("coolest", "cool"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("thieves", "thief"),
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("echoes", "echo"),
    ("shoes", "shoe"),
];

/// Words whose surface form is already the lemma despite a matching suffix.
/// Mostly `-ing`/`-ed` adjectives that carry sentiment on their own.
const KEEP: &[&str] = &[
    "always", "news", "series", "species", "yes", "bus", "gas", "lens", "its", "his", "hers",
    "ours", "yours", "theirs", "physics", "lyrics", "thing", "nothing", "something", "anything",
    "everything", "morning", "evening", "king", "ring", "sing", "bring", "spring", "string",
    "wing", "swing", "sibling", "ceiling", "during", "wedding", "amazing", "interesting",
    "boring", "annoying", "exciting", "disappointing", "disgusting", "inspiring", "stunning",
    "relaxing", "touching", "outstanding", "charming", "surprising", "shocking", "satisfying",
    "refreshing", "entertaining", "frustrating", "confusing", "embarrassing", "heartbreaking",
    "breathtaking", "fascinating", "excited", "bored", "tired", "interested", "disappointed",
    "amazed", "talented", "underrated", "overrated", "beloved", "blessed", "scared", "annoyed",
    "confused", "depressed", "impressed", "obsessed", "relaxed", "surprised", "shocked",
    "worried", "frustrated", "inspired", "satisfied", "speed", "need", "feed", "seed", "bed",
    "red", "indeed",
];

/// Nouns and verbs whose base form ends in `-ie`, so `-ies`/`-ied` must not become `-y`.
const IE_WORDS: &[&str] = &[
    "movie", "cookie", "zombie", "selfie", "rookie", "hoodie", "goalie", "genie", "brownie",
    "smoothie", "newbie", "freebie", "calorie", "prairie", "boogie", "veggie", "indie", "auntie",
    "sweetie", "birdie", "cutie", "foodie", "roomie", "hippie", "techie", "groupie", "pixie",
    "magpie", "necktie", "bootie", "eerie", "oldie", "goodie", "baddie", "bestie", "kiddie",
    "aussie", "yuppie", "quickie", "junkie", "talkie",
];

/// Restores the `-ie` ending when the stripped stem names an `-ie` word.
/// Single-letter stems (`lies`, `tied`, `dies`) always take `-ie`.
fn ie_or_y(stem: &str) -> String {
    let ie = stem.len() == 1 || IE_WORDS.iter().any(|w| w.strip_suffix("ie") == Some(stem));
    if ie {
        format!("{stem}ie")
    } else {
        format!("{stem}y")
    }
}

/// Returns the dictionary form of a lowercase token.
pub(crate) fn lemmatize(word: &str) -> String {
    if let Some(&(_, lemma)) = IRREGULAR.iter().find(|(form, _)| *form == word) {
        return lemma.to_owned();
    }
    if KEEP.contains(&word) || word.chars().count() <= 3 || !word.is_ascii() {
        return word.to_owned();
    }
    strip_plural(word)
        .or_else(|| strip_verb_suffix(word))
        .unwrap_or_else(|| word.to_owned())
}

fn strip_plural(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        return Some(ie_or_y(stem));
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return Some(format!("{stem}ss"));
    }
    for suffix in ["ches", "shes", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_owned());
        }
    }
    if word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return Some(word[..word.len() - 1].to_owned());
    }
    None
}

fn strip_verb_suffix(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ied") {
        return Some(ie_or_y(stem));
    }
    if let Some(stem) = word.strip_suffix("eed") {
        return (measure(stem.as_bytes()) > 0).then(|| format!("{stem}ee"));
    }
    let stem = word
        .strip_suffix("ing")
        .or_else(|| word.strip_suffix("ed"))?;
    if stem.len() < 2 || !stem.bytes().any(is_vowel) {
        return None;
    }
    Some(restore_stem(stem))
}

/// Undoes consonant doubling and restores a dropped silent `e`.
fn restore_stem(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    let last = bytes[n - 1];

    if ["at", "bl", "iz", "dg"].iter().any(|s| stem.ends_with(s)) || last == b'v' {
        return format!("{stem}e");
    }
    if n >= 2 && bytes[n - 2] == last && !is_vowel(last) && !b"lsfz".contains(&last) {
        return stem[..n - 1].to_owned();
    }
    if measure(bytes) == 1 && ends_cvc(bytes) {
        return format!("{stem}e");
    }
    stem.to_owned()
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Whether position `i` acts as a consonant (`y` after a consonant is a vowel).
fn is_consonant(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'y' => i == 0 || !is_consonant(bytes, i - 1),
        b => !is_vowel(b),
    }
}

/// Number of vowel-consonant sequences in the stem.
fn measure(bytes: &[u8]) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..bytes.len() {
        let consonant = is_consonant(bytes, i);
        if consonant && prev_vowel {
            m += 1;
        }
        prev_vowel = !consonant;
    }
    m
}

/// consonant-vowel-consonant ending where the final consonant is not w, x or y.
fn ends_cvc(bytes: &[u8]) -> bool {
    let n = bytes.len();
    n >= 3
        && is_consonant(bytes, n - 3)
        && !is_consonant(bytes, n - 2)
        && is_consonant(bytes, n - 1)
        && !matches!(bytes[n - 1], b'w' | b'x' | b'y')
}

#[cfg(test)]
mod tests {
    use super::lemmatize;

    #[test]
    fn irregular_forms() {
        assert_eq!(lemmatize("was"), "be");
        assert_eq!(lemmatize("went"), "go");
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("n't"), "not");
        assert_eq!(lemmatize("best"), "good");
    }

    #[test]
    fn plural_nouns() {
        assert_eq!(lemmatize("videos"), "video");
        assert_eq!(lemmatize("stories"), "story");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("watches"), "watch");
        assert_eq!(lemmatize("boxes"), "box");
    }

    #[test]
    fn ie_nouns_keep_their_ending() {
        assert_eq!(lemmatize("movies"), "movie");
        assert_eq!(lemmatize("cookies"), "cookie");
        assert_eq!(lemmatize("zombies"), "zombie");
        assert_eq!(lemmatize("selfies"), "selfie");
        assert_eq!(lemmatize("lies"), "lie");
        assert_eq!(lemmatize("ties"), "tie");
        assert_eq!(lemmatize("tied"), "tie");
        assert_eq!(lemmatize("parties"), "party");
        assert_eq!(lemmatize("cried"), "cry");
    }

    #[test]
    fn words_ending_in_s_that_are_not_plurals() {
        assert_eq!(lemmatize("class"), "class");
        assert_eq!(lemmatize("genius"), "genius");
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("series"), "series");
    }

    #[test]
    fn progressive_verbs() {
        assert_eq!(lemmatize("running"), "run");
        assert_eq!(lemmatize("making"), "make");
        assert_eq!(lemmatize("playing"), "play");
        assert_eq!(lemmatize("watching"), "watch");
        assert_eq!(lemmatize("listening"), "listen");
        assert_eq!(lemmatize("falling"), "fall");
    }

    #[test]
    fn past_tense_verbs() {
        assert_eq!(lemmatize("loved"), "love");
        assert_eq!(lemmatize("stopped"), "stop");
        assert_eq!(lemmatize("created"), "create");
        assert_eq!(lemmatize("cried"), "cry");
        assert_eq!(lemmatize("received"), "receive");
        assert_eq!(lemmatize("wanted"), "want");
        assert_eq!(lemmatize("agreed"), "agree");
        assert_eq!(lemmatize("need"), "need");
    }

    #[test]
    fn sentiment_adjectives_are_kept() {
        assert_eq!(lemmatize("amazing"), "amazing");
        assert_eq!(lemmatize("disappointed"), "disappointed");
        assert_eq!(lemmatize("boring"), "boring");
    }

    #[test]
    fn short_and_non_ascii_words_are_untouched() {
        assert_eq!(lemmatize("bus"), "bus");
        assert_eq!(lemmatize("its"), "its");
        assert_eq!(lemmatize("café"), "café");
    }
}
