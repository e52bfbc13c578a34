use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tasksync_content::tree::parse_indentation;
use tasksync_content::{
    DisplayConfig, LineParent, Priority, PrioritySyntax, SyntaxCodec, TagsSyntax, TaskRecord,
    TaskStatus, TimestampSyntax, canonical_tag, normalize,
};

fn priority() -> impl Strategy<Value = Option<Priority>> {
    prop::option::of(prop::sample::select(Priority::ALL.to_vec()))
}

fn dialects() -> impl Strategy<Value = DisplayConfig> {
    (
        prop::sample::select(vec![
            PrioritySyntax::Symbol,
            PrioritySyntax::Emoji,
            PrioritySyntax::Dataview,
        ]),
        prop::sample::select(vec![
            TimestampSyntax::Symbol,
            TimestampSyntax::Emoji,
            TimestampSyntax::Dataview,
        ]),
        prop::sample::select(vec![TagsSyntax::Symbol, TagsSyntax::Emoji, TagsSyntax::Dataview]),
    )
        .prop_map(|(p, t, g)| DisplayConfig {
            priority_syntax: p,
            timestamp_syntax: t,
            tags_syntax: g,
            ..DisplayConfig::default()
        })
}

proptest! {
    #[test]
    fn test_render_then_parse_preserves_visible_fields(
        words in prop::collection::vec("[A-Za-z][a-z]{0,8}", 1..6),
        tags in prop::collection::btree_set("[a-zA-Z0-9+&(),. /_-]{1,8}", 0..4),
        priority in priority(),
        done in any::<bool>(),
        seconds in 0i64..4_000_000_000,
        config in dialects(),
    ) {
        let mut record = TaskRecord::new("x", words.join(" "))
            .with_tags(tags)
            .with_created_at(Utc.timestamp_opt(seconds, 0).unwrap());
        record.priority = priority;
        if done {
            record.status = TaskStatus::Done;
        }

        let codec = SyntaxCodec::new(config);
        let parsed = codec.parse(&codec.render(&record)).unwrap();

        prop_assert_eq!(&parsed.text, &record.text);
        prop_assert_eq!(parsed.status, record.status);
        prop_assert_eq!(parsed.priority, record.priority);
        let mut written: Vec<String> = Vec::new();
        for tag in record.tags.iter().filter_map(|t| canonical_tag(t)) {
            if !written.contains(&tag) {
                written.push(tag);
            }
        }
        prop_assert_eq!(&parsed.tags, &written);
        let created = parsed.created.map(|c| c.resolve(Some(record.created_at)));
        prop_assert_eq!(created, Some(record.created_at));
    }

    #[test]
    fn test_canonical_tag_is_stable(s in "[a-zA-Z0-9+&(),. #/_-]{0,12}") {
        if let Some(tag) = canonical_tag(&s) {
            prop_assert_eq!(canonical_tag(&tag), Some(tag.clone()));
            prop_assert!(!tag.contains(' ') && !tag.contains(','));
        }
    }

    #[test]
    fn test_normalize_is_idempotent(s in "[A-Za-zÀ-ÿ0-9 \t.,!?#_-]*") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
        prop_assert!(!once.contains("  "));
        prop_assert!(!once.contains('#'));
    }

    #[test]
    fn test_normalize_ignores_case_and_punctuation(words in prop::collection::vec("[a-z]{1,6}", 1..5)) {
        let plain = words.join(" ");
        let shouted = format!("{}!!", words.join(", ").to_uppercase());
        prop_assert_eq!(normalize(&plain), normalize(&shouted));
    }

    #[test]
    fn test_children_point_backwards_one_level_up(depths in prop::collection::vec(0usize..4, 0..20)) {
        for (i, parent) in parse_indentation(&depths).into_iter().enumerate() {
            match parent {
                LineParent::Root => prop_assert_eq!(depths[i], 0),
                LineParent::Child(p) => {
                    prop_assert!(p < i);
                    prop_assert_eq!(depths[p] + 1, depths[i]);
                }
                LineParent::Orphan => prop_assert!(depths[i] > 0),
            }
        }
    }
}
