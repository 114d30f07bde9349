//! Classification of the reference change scenarios

use livepatch_classifier::{HtmlClassifier, RuleClassifier};
use livepatch_core::{ClassificationError, HtmlSide, PatternType, Strategy};
use proptest::prelude::*;
use test_case::test_case;

#[test_case("<div>Hello</div>", "<div>Hi there</div>", PatternType::StaticDynamic, Strategy::StaticDynamic ; "text change")]
#[test_case("<div class=\"old\">Content</div>", "<div class=\"new\">Content</div>", PatternType::Markerizable, Strategy::Markers ; "attribute change")]
#[test_case("<ul><li>Item 1</li></ul>", "<ul><li>Item 1</li><li>Item 2</li></ul>", PatternType::Granular, Strategy::Granular ; "list append")]
#[test_case("<div><p>Old</p></div>", "<article><h1>New</h1></article>", PatternType::Replacement, Strategy::Replacement ; "structural swap")]
fn test_reference_scenarios(old: &str, new: &str, pattern: PatternType, strategy: Strategy) {
    let result = RuleClassifier::new().diff(old, new).unwrap();
    assert_eq!(result.pattern, pattern);
    assert_eq!(result.strategy, strategy);
    assert!(result.is_canonical());
}

#[test]
fn test_unparsable_side_is_reported() {
    let err = RuleClassifier::new()
        .diff("<div>ok</div>", "<div><span>broken</div>")
        .unwrap_err();
    assert!(matches!(
        err,
        ClassificationError::Unparsable {
            side: HtmlSide::New,
            ..
        }
    ));
}

#[test]
fn test_classifier_as_trait_object() {
    let classifier: Box<dyn HtmlClassifier> = Box::new(RuleClassifier::new());
    let result = classifier.quick_diff("<p>a</p>", "<p>b</p>").unwrap();
    assert_eq!(result.strategy, Strategy::StaticDynamic);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_diff_is_deterministic(a in "[a-z ]{0,12}", b in "[a-z ]{0,12}") {
        let classifier = RuleClassifier::new();
        let old = format!("<p>{a}</p>");
        let new = format!("<p>{b}</p>");
        let first = classifier.diff(&old, &new).unwrap();
        let second = classifier.diff(&old, &new).unwrap();
        prop_assert_eq!(&first, &second, "same pair must classify the same way");
        prop_assert_eq!(first.pattern, PatternType::StaticDynamic);
    }
}
