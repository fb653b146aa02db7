use emergence_transcript::{build_pairs, segment, segment_pairs, Pair, Role, SegmentationStrategy, Turn};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn header_labeled_chat_yields_two_pairs() {
    let text = "User: Hello there.\nAssistant: Hi! How can I help?\nUser: Tell me about the weather.\nAssistant: It's sunny today.";

    let segmentation = segment(text);
    assert_eq!(segmentation.strategy, SegmentationStrategy::HeaderLabeled);
    assert_eq!(segmentation.turns.len(), 4);
    assert_eq!(segmentation.count_role(Role::User), 2);
    assert_eq!(segmentation.count_role(Role::Assistant), 2);

    assert_eq!(
        build_pairs(&segmentation.turns),
        vec![
            Pair::new(1, "Hello there.", "Hi! How can I help?"),
            Pair::new(2, "Tell me about the weather.", "It's sunny today."),
        ]
    );
}

#[test]
fn unlabeled_paragraphs_fall_back_to_alternation() {
    let text = "I love pizza.\n\nPizza is great, many toppings exist.";

    let (strategy, pairs) = segment_pairs(text);
    assert_eq!(strategy, SegmentationStrategy::Alternation);
    assert_eq!(
        pairs,
        vec![Pair::new(
            1,
            "I love pizza.",
            "Pizza is great, many toppings exist."
        )]
    );
}

#[test]
fn chatgpt_export_dialect() {
    let text = "\
You said:
Can you write a haiku?

ChatGPT said:
Autumn moonlight—
a worm digs silently
into the chestnut.

You said:
Another one
ChatGPT said:
Sure.";

    let (strategy, pairs) = segment_pairs(text);
    assert_eq!(strategy, SegmentationStrategy::HeaderLabeled);
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].user, "Can you write a haiku?");
    assert_eq!(
        pairs[0].assistant,
        "Autumn moonlight—\na worm digs silently\ninto the chestnut."
    );
    assert_eq!(pairs[1], Pair::new(2, "Another one", "Sure."));
}

#[test]
fn markdown_dialect_with_mixed_labels() {
    let text = "## Human: first\n**Claude:** second\n### User: third\n_Assistant:_ fourth";

    let (strategy, pairs) = segment_pairs(text);
    assert_eq!(strategy, SegmentationStrategy::HeaderLabeled);
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].user, "first");
    assert_eq!(pairs[0].assistant, "** second");
    assert_eq!(pairs[1].user, "third");
    assert_eq!(pairs[1].assistant, "_ fourth");
}

#[test]
fn labeled_transcript_never_mixes_in_fallback_blocks() {
    // Only assistant headers: roles were recognized, so no alternation happens
    // even though nothing can be paired.
    let text = "Assistant: hello\n\nAssistant: again\n\nsome trailing paragraph";

    let segmentation = segment(text);
    assert_eq!(segmentation.strategy, SegmentationStrategy::HeaderLabeled);
    assert!(build_pairs(&segmentation.turns).is_empty());
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant), Just(Role::Unlabeled)]
}

proptest! {
    #[test]
    fn pairs_never_exceed_assistant_turns(roles in proptest::collection::vec(role_strategy(), 0..40)) {
        let turns: Vec<Turn> = roles
            .iter()
            .enumerate()
            .map(|(i, role)| Turn::new(*role, format!("turn-{i}")))
            .collect();

        let pairs = build_pairs(&turns);
        let assistants = turns.iter().filter(|t| t.role == Role::Assistant).count();
        prop_assert!(pairs.len() <= assistants);

        for (position, pair) in pairs.iter().enumerate() {
            prop_assert_eq!(pair.index, position + 1);
            let user_pos = turns.iter().position(|t| t.text == pair.user).unwrap();
            let assistant_pos = turns.iter().position(|t| t.text == pair.assistant).unwrap();
            prop_assert_eq!(turns[user_pos].role, Role::User);
            prop_assert_eq!(turns[assistant_pos].role, Role::Assistant);
            prop_assert!(user_pos < assistant_pos);
        }
    }

    #[test]
    fn segmentation_never_panics(text in "\\PC{0,200}") {
        let segmentation = segment(&text);
        for turn in &segmentation.turns {
            prop_assert!(!turn.text.trim().is_empty());
        }
    }
}
