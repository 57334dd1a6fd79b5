pub mod quiz_rules;
