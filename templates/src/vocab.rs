use dlrete_lexicon::{Symbol, SymbolTable};

/// Every fact-type and attribute-key symbol the template catalogue
/// refers to, interned once against the engine's shared symbol table.
/// Keeping this as a single struct means a typo in an attribute name is
/// a missing-field compile error instead of a silently-unmatched rule.
#[derive(Clone)]
pub struct Vocab {
    pub type_key: Symbol,

    // Fact types
    pub instance_of: Symbol,
    pub concept_assertion: Symbol,
    pub subsumption: Symbol,
    pub role_assertion: Symbol,
    pub sub_property: Symbol,
    pub same_as: Symbol,
    pub different_from: Symbol,
    pub symmetric: Symbol,
    pub transitive: Symbol,
    pub functional: Symbol,
    pub inverse_functional: Symbol,
    pub asymmetric: Symbol,
    pub irreflexive: Symbol,
    pub property_chain: Symbol,
    pub equivalent_property: Symbol,
    pub equivalent_class: Symbol,
    pub inverse_of: Symbol,
    pub disjoint_with: Symbol,
    pub property_disjoint_with: Symbol,
    pub has_key: Symbol,
    pub all_different: Symbol,
    pub all_disjoint_classes: Symbol,
    pub all_disjoint_properties: Symbol,
    pub domain: Symbol,
    pub range: Symbol,
    pub intersection_of: Symbol,
    pub union_of: Symbol,
    pub complement_of: Symbol,
    pub one_of: Symbol,
    pub some_values_from: Symbol,
    pub all_values_from: Symbol,
    pub has_value: Symbol,
    pub max_cardinality: Symbol,
    pub max_qualified_cardinality: Symbol,
    pub negative_property_assertion: Symbol,
    pub violation: Symbol,
    pub divergence: Symbol,

    // Attribute keys
    pub individual: Symbol,
    pub concept: Symbol,
    pub sub: Symbol,
    pub sup: Symbol,
    pub subject: Symbol,
    pub role: Symbol,
    pub object: Symbol,
    pub ind1: Symbol,
    pub ind2: Symbol,
    pub property: Symbol,
    pub chain: Symbol,
    pub prop1: Symbol,
    pub prop2: Symbol,
    pub class1: Symbol,
    pub class2: Symbol,
    pub class: Symbol,
    pub keys: Symbol,
    pub members: Symbol,
    pub concept1: Symbol,
    pub concept2: Symbol,
    pub filler: Symbol,
    pub bound: Symbol,
    pub violation_type: Symbol,
    pub detected_by: Symbol,
    pub facts: Symbol,
    pub rule: Symbol,
    pub budget: Symbol,

    // Well-known individuals/classes
    pub thing: Symbol,
    pub nothing: Symbol,
}

impl Vocab {
    pub fn new(symbols: &SymbolTable) -> Self {
        let i = |s: &str| symbols.intern(s);
        Vocab {
            type_key: i("type"),

            instance_of: i("instance_of"),
            concept_assertion: i("concept_assertion"),
            subsumption: i("subsumption"),
            role_assertion: i("role_assertion"),
            sub_property: i("sub_property"),
            same_as: i("same_as"),
            different_from: i("different_from"),
            symmetric: i("symmetric"),
            transitive: i("transitive"),
            functional: i("functional"),
            inverse_functional: i("inverse_functional"),
            asymmetric: i("asymmetric"),
            irreflexive: i("irreflexive"),
            property_chain: i("property_chain"),
            equivalent_property: i("equivalent_property"),
            equivalent_class: i("equivalent_class"),
            inverse_of: i("inverse_of"),
            disjoint_with: i("disjoint_with"),
            property_disjoint_with: i("property_disjoint_with"),
            has_key: i("has_key"),
            all_different: i("all_different"),
            all_disjoint_classes: i("all_disjoint_classes"),
            all_disjoint_properties: i("all_disjoint_properties"),
            domain: i("domain"),
            range: i("range"),
            intersection_of: i("intersection_of"),
            union_of: i("union_of"),
            complement_of: i("complement_of"),
            one_of: i("one_of"),
            some_values_from: i("some_values_from"),
            all_values_from: i("all_values_from"),
            has_value: i("has_value"),
            max_cardinality: i("max_cardinality"),
            max_qualified_cardinality: i("max_qualified_cardinality"),
            negative_property_assertion: i("negative_property_assertion"),
            violation: i("violation"),
            divergence: i("divergence"),

            individual: i("individual"),
            concept: i("concept"),
            sub: i("sub"),
            sup: i("sup"),
            subject: i("subject"),
            role: i("role"),
            object: i("object"),
            ind1: i("ind1"),
            ind2: i("ind2"),
            property: i("property"),
            chain: i("chain"),
            prop1: i("prop1"),
            prop2: i("prop2"),
            class1: i("class1"),
            class2: i("class2"),
            class: i("class"),
            keys: i("keys"),
            members: i("members"),
            concept1: i("concept1"),
            concept2: i("concept2"),
            filler: i("filler"),
            bound: i("bound"),
            violation_type: i("violation_type"),
            detected_by: i("detected_by"),
            facts: i("facts"),
            rule: i("rule"),
            budget: i("budget"),

            thing: i("owl:Thing"),
            nothing: i("owl:Nothing"),
        }
    }
}
