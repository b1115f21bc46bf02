//! Property-based tests for the inference adapter using proptest.

use hirecast_core::inference::{FeatureRow, parse_float};
use hirecast_core::predictor::{DecisionTree, LinearModel, TreeNode, TreeTask};
use hirecast_core::scaler::{IdentityScaler, StandardScaler};
use hirecast_core::{InferenceError, InputRecord, predict_record};
use proptest::prelude::*;

fn sample_tree() -> DecisionTree {
    DecisionTree {
        task: TreeTask::Regression,
        n_features: 4,
        feature_names: vec![],
        classes: vec![],
        nodes: vec![
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 1,
                right: 2,
            },
            TreeNode::Split {
                feature: 3,
                threshold: 0.0,
                left: 3,
                right: 4,
            },
            TreeNode::Leaf {
                value: vec![3.0],
            },
            TreeNode::Leaf {
                value: vec![1.0],
            },
            TreeNode::Leaf {
                value: vec![2.0],
            },
        ],
    }
}

fn sample_scaler() -> StandardScaler {
    StandardScaler {
        mean: vec![35.0, 5.0, 5.0, 0.5],
        scale: vec![10.0, 2.0, 2.0, 0.5],
        with_mean: true,
        with_std: true,
    }
}

proptest! {
    #[test]
    fn numeric_fields_coerce_in_order(values in prop::array::uniform4(-1.0e6f64..1.0e6)) {
        let strings = values.map(|v| v.to_string());
        let record = InputRecord::from_values([
            strings[0].as_str(),
            strings[1].as_str(),
            strings[2].as_str(),
            strings[3].as_str(),
        ]);
        let vector = FeatureRow::from_record(&record).coerce().unwrap();
        prop_assert_eq!(vector.len(), 4);
        prop_assert_eq!(vector.as_slice(), &values[..]);
    }

    #[test]
    fn non_numeric_field_never_predicts(
        position in 0usize..4,
        junk in "[a-zA-Z ]{0,8}",
    ) {
        // Letters alone can still spell inf/nan; skip those.
        prop_assume!(parse_float(&junk).is_none());
        let mut fields = ["30", "7", "5", "1"];
        fields[position] = junk.as_str();
        let record = InputRecord::from_values(fields);

        let model = LinearModel { coef: vec![1.0; 4], intercept: 0.0 };
        let scaler = IdentityScaler { n_features: Some(4) };
        let err = predict_record(&record, &scaler, &model).unwrap_err();
        let is_conversion = matches!(err, InferenceError::Conversion { .. });
        prop_assert!(is_conversion);
    }

    #[test]
    fn prediction_is_deterministic(values in prop::array::uniform4(0.0f64..100.0)) {
        let strings = values.map(|v| format!("{v}"));
        let record = InputRecord::from_values([
            strings[0].as_str(),
            strings[1].as_str(),
            strings[2].as_str(),
            strings[3].as_str(),
        ]);
        let tree = sample_tree();
        let scaler = sample_scaler();
        let first = predict_record(&record, &scaler, &tree).unwrap();
        let second = predict_record(&record, &scaler, &tree).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn model_only_sees_scaled_values(age in 0.0f64..100.0, gender in 0.0f64..1.0) {
        let age_s = age.to_string();
        let gender_s = gender.to_string();
        let record = InputRecord::from_values([age_s.as_str(), "5", "5", gender_s.as_str()]);
        let tree = sample_tree();
        let prediction = predict_record(&record, &sample_scaler(), &tree).unwrap();

        // The tree splits at 0.0, which only the standardized values straddle.
        let scaled_age = (age - 35.0) / 10.0;
        let scaled_gender = (gender - 0.5) / 0.5;
        let expected = if scaled_age > 0.0 {
            3.0
        } else if scaled_gender <= 0.0 {
            1.0
        } else {
            2.0
        };
        prop_assert_eq!(prediction.values(), &[expected][..]);
    }
}
