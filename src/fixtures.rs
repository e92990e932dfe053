#[cfg(test)]
pub mod test {
    use crate::descriptor::{EnforcedVariables, TypeDescriptor, Variable};
    use crate::source::MemorySource;

    /// Marked fields of every flavour plus one unmarked field.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct TestModel {
        pub un_named_variable: String,
        pub named_variable: String,
        pub not_required_un_named_variable: String,
        pub not_required_named_variable: String,
        pub variable_within_section: String,
        pub variable_within_deep_section: String,
        pub integer_value: i32,
        pub ignored_property: String,
    }

    impl EnforcedVariables for TestModel {
        fn describe() -> TypeDescriptor<Self> {
            TypeDescriptor::<Self>::builder()
                .variable("UnNamedVariable", |m| &mut m.un_named_variable)
                .variable_with("NamedVariable", Variable::named("DifferentName1"), |m| {
                    &mut m.named_variable
                })
                .variable_with(
                    "NotRequiredUnNamedVariable",
                    Variable::new().optional(),
                    |m| &mut m.not_required_un_named_variable,
                )
                .variable_with(
                    "NotRequiredNamedVariable",
                    Variable::named("DifferentName2").optional(),
                    |m| &mut m.not_required_named_variable,
                )
                .variable_with(
                    "VariableWithinSection",
                    Variable::named("Section__Variable"),
                    |m| &mut m.variable_within_section,
                )
                .variable_with(
                    "VariableWithinDeepSection",
                    Variable::named("Section__InnerSection__OneMoreSection__Variable"),
                    |m| &mut m.variable_within_deep_section,
                )
                .variable("IntegerValue", |m| &mut m.integer_value)
                .field("IgnoredProperty", |m| &mut m.ignored_property)
                .build()
        }
    }

    /// Enforce-all type: unmarked fields are checked under their own name.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct TestModel2 {
        pub named_variable: String,
        pub variable_enforced_without_tag: String,
        pub variable_within_section: String,
        pub integer_value: i32,
    }

    impl EnforcedVariables for TestModel2 {
        fn describe() -> TypeDescriptor<Self> {
            TypeDescriptor::<Self>::builder()
                .enforce_all(true)
                .variable_with(
                    "NamedVariable",
                    Variable::named("DifferentName1").optional(),
                    |m| &mut m.named_variable,
                )
                .field("VariableEnforcedWithoutTag", |m| {
                    &mut m.variable_enforced_without_tag
                })
                .variable_with(
                    "VariableWithinSection",
                    Variable::named("Section__Variable"),
                    |m| &mut m.variable_within_section,
                )
                .field("IntegerValue", |m| &mut m.integer_value)
                .build()
        }
    }

    /// A type whose constructor always fails.
    #[derive(Debug)]
    pub struct Unconstructible {
        pub value: String,
    }

    impl EnforcedVariables for Unconstructible {
        fn describe() -> TypeDescriptor<Self> {
            TypeDescriptor::<Self>::builder_with(|| Err("no zero-argument constructor".to_string()))
                .variable("Value", |m: &mut Unconstructible| &mut m.value)
                .build()
        }
    }

    /// A source holding every key [`TestModel`] asks for.
    ///
    /// `include_required` adds the two flat required keys; the section keys and
    /// the integer are always present so tests can isolate the flat ones.
    pub fn configuration(include_required: bool, include_optional: bool) -> MemorySource {
        let mut source = MemorySource::new()
            .with("Section:Variable", "v3")
            .with("Section:InnerSection:OneMoreSection:Variable", "deep")
            .with("IntegerValue", "42");

        if include_required {
            source.insert("UnNamedVariable", "v1");
            source.insert("DifferentName1", "v2");
        }

        if include_optional {
            source.insert("NotRequiredUnNamedVariable", "o1");
            source.insert("DifferentName2", "o2");
        }

        source
    }

    #[test]
    fn configuration_toggles_required_keys() {
        use crate::source::ConfigSource;

        assert!(configuration(true, false).get("UnNamedVariable").is_some());
        assert!(configuration(false, false).get("UnNamedVariable").is_none());
        assert!(configuration(false, true).get("DifferentName2").is_some());
    }
}
