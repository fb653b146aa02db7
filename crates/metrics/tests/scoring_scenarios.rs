use emergence_metrics::features::{jaccard, trigram_redundancy};
use emergence_metrics::{
    emergence_score, ConversationAnalyzer, ConversationScorer, FeatureExtractor, Lexicon,
    MetricsProfile, PrimarySignals,
};
use emergence_transcript::Pair;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use regex::Regex;
use std::collections::HashSet;

fn conversation(assistant: &[&str]) -> Vec<Pair> {
    assistant
        .iter()
        .enumerate()
        .map(|(i, a)| Pair::new(i + 1, format!("prompt number {}", i + 1), *a))
        .collect()
}

#[test]
fn motif_latency_spans_the_gap_between_uses() {
    let pairs = conversation(&[
        "an ordinary answer",
        "the spiral widens",
        "another ordinary answer",
        "still nothing special",
        "back to the spiral",
    ]);
    let metrics = ConversationScorer::with_defaults().score(&pairs);

    let latencies: Vec<Option<usize>> =
        metrics.iter().map(|m| m.motif_latency_min_turns).collect();
    assert_eq!(latencies, vec![None, None, None, None, Some(3)]);

    let used: Vec<usize> = metrics.iter().map(|m| m.motif_count_used).collect();
    assert_eq!(used, vec![0, 1, 0, 0, 1]);
}

#[test]
fn six_turn_control_borrows_the_previous_prompt() {
    let pairs: Vec<Pair> = (1..=6)
        .map(|i| {
            Pair::new(
                i,
                format!("tell me about comet{i}"),
                format!("comet{i} has a bright tail"),
            )
        })
        .collect();
    let analysis = ConversationAnalyzer::with_defaults().analyze_pairs(
        emergence_transcript::SegmentationStrategy::HeaderLabeled,
        &pairs,
    );

    let control = analysis.control.expect("control for a non-empty conversation");
    assert_eq!(control.shift, 5);
    assert_eq!(control.len(), analysis.metrics.len());
    assert_eq!(control.partners, vec![6, 1, 2, 3, 4, 5]);

    let fx = FeatureExtractor::new(Lexicon::builtin());
    for (i, turn) in analysis.metrics.iter().enumerate() {
        let borrowed = &analysis.metrics[control.partners[i] - 1].user;
        let expected = emergence_score(
            &turn.primaries_with_novelty(fx.normalized_novelty(&turn.assistant, borrowed, "")),
            fx.coherence_penalty(&turn.assistant, borrowed),
        );
        assert_eq!(control.scores[i], expected);
    }
}

#[test]
fn full_pipeline_from_fallback_text() {
    let analysis = ConversationAnalyzer::with_defaults()
        .analyze_transcript("I love pizza.\n\nPizza is great, many toppings exist.");

    assert_eq!(analysis.metrics.len(), 1);
    let turn = &analysis.metrics[0];
    assert_eq!(turn.user, "I love pizza.");
    assert_eq!(turn.assistant, "Pizza is great, many toppings exist.");
    assert_eq!(turn.proposal_uptake, None);
    // pizza, great, many, toppings, exist
    assert_eq!(turn.assistant_len_tokens, 5);
    assert_eq!(turn.noun_overlap, 0.2);

    let control = analysis.control.unwrap();
    assert!(control.is_self_paired());
}

#[test]
fn metrics_serialize_with_snake_case_bins_and_null_latency() {
    let metrics = ConversationScorer::with_defaults().score(&conversation(&["short reply"]));
    let json = serde_json::to_value(&metrics[0]).unwrap();

    assert_eq!(json["assistant_len_bin"], "short");
    assert_eq!(json["motif_latency_min_turns"], serde_json::Value::Null);
    assert_eq!(json["proposal_uptake"], serde_json::Value::Null);
    assert_eq!(json["index"], 1);
}

#[test]
fn profile_from_toml_drives_the_analyzer() {
    let profile = MetricsProfile::from_toml_str(
        r#"
schema_version = 1

[scoring]
hot_threshold = 0.0
control_shift = 1
"#,
    )
    .unwrap();
    let analyzer = ConversationAnalyzer::new(&profile).unwrap();
    let analysis = analyzer.analyze_transcript("User: a\nAssistant: b\nUser: c\nAssistant: d");

    assert!(analysis.metrics.iter().all(|m| m.hot));
    assert_eq!(analysis.control.unwrap().partners, vec![2, 1]);
}

fn word_set() -> impl Strategy<Value = HashSet<String>> {
    prop::collection::hash_set("[a-e]{1,3}", 0..8)
}

proptest! {
    #[test]
    fn tokens_are_never_stopwords_or_punctuation(text in "\\PC{0,120}") {
        let fx = FeatureExtractor::new(Lexicon::builtin());
        let word = Regex::new(r"\w").unwrap();
        for token in fx.tokenize(&text) {
            prop_assert!(!fx.lexicon().is_stopword(&token));
            prop_assert!(word.is_match(&token));
        }
    }

    #[test]
    fn jaccard_stays_in_unit_interval(a in word_set(), b in word_set()) {
        let value = jaccard(&a, &b);
        prop_assert!((0.0..=1.0).contains(&value));
        if a.is_empty() {
            prop_assert_eq!(value, 0.0);
        } else {
            prop_assert_eq!(jaccard(&a, &a), 1.0);
        }
    }

    #[test]
    fn short_token_lists_have_no_redundancy(tokens in prop::collection::vec("[a-z]{1,4}", 0..3)) {
        prop_assert_eq!(trigram_redundancy(&tokens), 0.0);
    }

    #[test]
    fn penalty_and_score_are_bounded(
        assistant in "[a-z ?.!✨]{0,200}",
        user in "[a-z ]{0,60}",
        history in "[a-z ]{0,60}",
    ) {
        let fx = FeatureExtractor::new(Lexicon::builtin());
        let penalty = fx.coherence_penalty(&assistant, &user);
        prop_assert!((0.0..=0.3).contains(&penalty));

        let signals = PrimarySignals {
            initiative: fx.initiative_agency(&assistant),
            synthesis: fx.synthesis_tension(&assistant),
            affect: fx.affective_charge(&assistant),
            self_continuity: fx.self_continuity(&assistant, 0.0),
            novelty: fx.normalized_novelty(&assistant, &user, &history),
        };
        let score = emergence_score(&signals, penalty);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn scored_conversations_stay_aligned(replies in prop::collection::vec("[a-z ✨]{0,40}", 0..8)) {
        let pairs: Vec<Pair> = replies
            .iter()
            .enumerate()
            .map(|(i, a)| Pair::new(i + 1, "question", a.as_str()))
            .collect();
        let analysis = ConversationAnalyzer::with_defaults().analyze_pairs(
            emergence_transcript::SegmentationStrategy::HeaderLabeled,
            &pairs,
        );

        prop_assert_eq!(analysis.metrics.len(), pairs.len());
        match analysis.control {
            Some(control) => prop_assert_eq!(control.len(), pairs.len()),
            None => prop_assert!(pairs.is_empty()),
        }
        for m in &analysis.metrics {
            prop_assert!((0.0..=1.0).contains(&m.emergence_score));
            prop_assert!((0.0..=0.3).contains(&m.coherence_penalty));
        }
    }
}
