//! Data model for structured documentation — format-agnostic.
//!
//! The signature tree (artifact → interfaces → operations → parameter groups
//! → parameters) is produced by an external structural parser. The codecs
//! only read it and attach [`Documentation`] entries to its nodes.

use crate::comment::Segment;
use crate::path::{Delimiters, IdentifierPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The one audience the compact format can express.
pub const PRIMARY_ADDRESSEE: &str = "Developer";

pub const ROLE_NONE: &str = "NONE";
pub const ROLE_ACTION: &str = "ACTION";
pub const ROLE_RULE: &str = "RULE";

/// Thematic grid whose untagged sentence is a rule, not an action.
pub const CHECKING_OPERATIONS: &str = "Checking Operations";

/// Deepest attribute nesting any traversal will follow.
pub const MAX_ATTRIBUTE_DEPTH: usize = 32;

/// What kind of information a documentation entry states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThematicRole {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Whether entries with this role may be marked as an error case.
    #[serde(default)]
    pub failable: bool,
}

impl ThematicRole {
    pub fn new(name: &str) -> Self {
        ThematicRole {
            name: name.to_string(),
            description: String::new(),
            failable: false,
        }
    }

    pub fn failable(mut self) -> Self {
        self.failable = true;
        self
    }
}

/// An intended audience of documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addressee {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub primary: bool,
}

impl Addressee {
    pub fn new(name: &str) -> Self {
        Addressee {
            name: name.to_string(),
            description: String::new(),
            primary: name == PRIMARY_ADDRESSEE,
        }
    }

    pub fn primary() -> Self {
        Addressee::new(PRIMARY_ADDRESSEE)
    }
}

/// One documentation unit attached to a signature element.
///
/// `addressees` is the display order; `texts` maps addressee names to text.
/// Both always name the same addressees. An empty text means the audience
/// was chosen but nothing has been written yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Documentation {
    #[serde(default)]
    pub role: Option<ThematicRole>,
    #[serde(default)]
    pub addressees: Vec<Addressee>,
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
    /// `None` documents the owning element, otherwise the nested parameter
    /// at this identifier path.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub error_case: bool,
}

impl Documentation {
    pub fn new(role: Option<ThematicRole>) -> Self {
        Documentation {
            role,
            ..Documentation::default()
        }
    }

    /// Entry with a single addressee and its text.
    pub fn addressed(role: Option<ThematicRole>, addressee: &Addressee, text: &str) -> Self {
        let mut doc = Documentation::new(role);
        doc.set_text(addressee, text);
        doc
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Replace the text for `addressee`, registering it on first sight.
    pub fn set_text(&mut self, addressee: &Addressee, text: &str) {
        self.register(addressee);
        self.texts.insert(addressee.name.clone(), text.to_string());
    }

    /// Append to the text for `addressee`, registering it on first sight.
    pub fn append_text(&mut self, addressee: &Addressee, text: &str) {
        self.register(addressee);
        self.texts
            .entry(addressee.name.clone())
            .or_default()
            .push_str(text);
    }

    fn register(&mut self, addressee: &Addressee) {
        if !self.addressees.iter().any(|a| a.name == addressee.name) {
            self.addressees.push(addressee.clone());
        }
    }

    pub fn text_for(&self, addressee: &str) -> &str {
        resolve_addressee_text(self, addressee)
    }

    pub fn role_name(&self) -> &str {
        role_name(self)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.role.as_ref().is_some_and(|r| r.name == name)
    }

    /// Null role or NONE: the entry states no particular kind of information.
    pub fn is_untyped(&self) -> bool {
        match self.role {
            Some(ref r) => r.name == ROLE_NONE,
            None => true,
        }
    }

    /// The flag only sticks for roles that can carry an error case.
    pub fn set_error_case(&mut self, error_case: bool) {
        self.error_case = error_case && self.role.as_ref().is_some_and(|r| r.failable);
    }

    /// Addressee sequence and text map name the same addressees.
    pub fn is_consistent(&self) -> bool {
        self.addressees.len() == self.texts.len()
            && self
                .addressees
                .iter()
                .all(|a| self.texts.contains_key(&a.name))
    }

    /// Trims every text; used when comparing decoded output.
    pub fn trimmed(mut self) -> Self {
        for text in self.texts.values_mut() {
            *text = text.trim().to_string();
        }
        self
    }
}

/// Text written for the named addressee, or an empty string.
pub fn resolve_addressee_text<'a>(doc: &'a Documentation, addressee: &str) -> &'a str {
    doc.texts.get(addressee).map(String::as_str).unwrap_or("")
}

/// Name of the entry's role, or an empty string.
pub fn role_name(doc: &Documentation) -> &str {
    doc.role.as_ref().map(|r| r.name.as_str()).unwrap_or("")
}

/// The one sentence allowed to open a class-level comment without a role.
pub fn is_introduction(doc: &Documentation, has_owning_operation: bool) -> bool {
    doc.is_untyped() && !has_owning_operation
}

// -- Signature tree -----------------------------------------------------------

/// Singular or plural; affects phrasing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Numerus {
    #[default]
    Singular,
    Plural,
}

/// Fields every signature element carries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementInfo {
    pub identifier: String,
    #[serde(default)]
    pub qualified_identifier: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub numerus: Numerus,
    #[serde(default)]
    pub documentations: Vec<Documentation>,
}

impl ElementInfo {
    pub fn new(identifier: &str) -> Self {
        ElementInfo {
            identifier: identifier.to_string(),
            qualified_identifier: identifier.to_string(),
            ..ElementInfo::default()
        }
    }
}

/// One input, output or error instance, with its accessible attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub qualified_type_name: String,
    /// Precomputed identifier path, root parameter first.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub attributes: Vec<Parameter>,
}

impl Parameter {
    /// A top-level parameter whose path is its own `identifier:type` segment.
    pub fn new(identifier: &str, type_name: &str) -> Self {
        let delimiters = Delimiters::default();
        let path = IdentifierPath::default().child(identifier, Some(type_name).filter(|t| !t.is_empty()));
        Parameter {
            info: ElementInfo::new(identifier),
            type_name: type_name.to_string(),
            qualified_type_name: type_name.to_string(),
            path: path.render(&delimiters),
            attributes: Vec::new(),
        }
    }

    /// Add a nested attribute, deriving its path from this parameter's.
    pub fn with_attribute(mut self, mut attribute: Parameter) -> Self {
        let delimiters = Delimiters::default();
        let parent = IdentifierPath::parse(&self.path, &delimiters);
        attribute.reroot(&parent, &delimiters, 0);
        self.attributes.push(attribute);
        self
    }

    fn reroot(&mut self, parent: &IdentifierPath, delimiters: &Delimiters, depth: usize) {
        let own = parent.child(
            &self.info.identifier,
            Some(self.type_name.as_str()).filter(|t| !t.is_empty()),
        );
        self.path = own.render(delimiters);
        if depth >= MAX_ATTRIBUTE_DEPTH {
            self.attributes.clear();
            return;
        }
        for attr in &mut self.attributes {
            attr.reroot(&own, delimiters, depth + 1);
        }
    }

    pub fn documented(mut self, doc: Documentation) -> Self {
        self.info.documentations.push(doc);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.info.identifier
    }

    /// Own entries, each pointing at this parameter unless it already
    /// names a target.
    pub fn targeted_documentations(&self) -> Vec<Documentation> {
        self.info
            .documentations
            .iter()
            .map(|doc| {
                let mut doc = doc.clone();
                if doc.target.is_none() {
                    doc.target = Some(self.path.clone());
                }
                doc
            })
            .collect()
    }

    pub fn find_attribute(&self, identifier: &str) -> Option<&Parameter> {
        self.attributes.iter().find(|a| a.info.identifier == identifier)
    }

    /// Follow `chain` down the attribute tree.
    pub fn walk(&self, chain: &[&str]) -> Option<&Parameter> {
        chain
            .iter()
            .take(MAX_ATTRIBUTE_DEPTH)
            .try_fold(self, |param, name| param.find_attribute(name))
    }

    /// This parameter or any attribute below it whose path matches.
    pub fn find_by_path(&self, path: &IdentifierPath, delimiters: &Delimiters) -> Option<&Parameter> {
        self.find_by_path_bounded(path, delimiters, 0)
    }

    fn find_by_path_bounded(
        &self,
        path: &IdentifierPath,
        delimiters: &Delimiters,
        depth: usize,
    ) -> Option<&Parameter> {
        if IdentifierPath::parse(&self.path, delimiters).same_target(path) {
            return Some(self);
        }
        if depth >= MAX_ATTRIBUTE_DEPTH {
            return None;
        }
        self.attributes
            .iter()
            .find_map(|a| a.find_by_path_bounded(path, delimiters, depth + 1))
    }

    pub fn find_by_path_mut(
        &mut self,
        path: &IdentifierPath,
        delimiters: &Delimiters,
    ) -> Option<&mut Parameter> {
        self.find_by_path_mut_bounded(path, delimiters, 0)
    }

    fn find_by_path_mut_bounded(
        &mut self,
        path: &IdentifierPath,
        delimiters: &Delimiters,
        depth: usize,
    ) -> Option<&mut Parameter> {
        if IdentifierPath::parse(&self.path, delimiters).same_target(path) {
            return Some(self);
        }
        if depth >= MAX_ATTRIBUTE_DEPTH {
            return None;
        }
        self.attributes
            .iter_mut()
            .find_map(|a| a.find_by_path_mut_bounded(path, delimiters, depth + 1))
    }

    /// Drop the entries of this parameter and every attribute below it.
    pub fn clear_documentations(&mut self) {
        self.clear_bounded(0);
    }

    fn clear_bounded(&mut self, depth: usize) {
        self.info.documentations.clear();
        if depth >= MAX_ATTRIBUTE_DEPTH {
            return;
        }
        for attr in &mut self.attributes {
            attr.clear_bounded(depth + 1);
        }
    }

    /// Depth-first visit of this parameter and its attributes.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Parameter, usize)) {
        self.visit_bounded(f, 0);
    }

    fn visit_bounded<'a>(&'a self, f: &mut dyn FnMut(&'a Parameter, usize), depth: usize) {
        f(self, depth);
        if depth >= MAX_ATTRIBUTE_DEPTH {
            return;
        }
        for attr in &self.attributes {
            attr.visit_bounded(f, depth + 1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Inputs,
    Outputs,
    Errors,
}

/// Ordered inputs, outputs, or one declared-error group of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroup {
    #[serde(flatten)]
    pub info: ElementInfo,
    pub kind: GroupKind,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl ParameterGroup {
    pub fn new(kind: GroupKind, parameters: Vec<Parameter>) -> Self {
        let identifier = match kind {
            GroupKind::Inputs => "inputs",
            GroupKind::Outputs => "outputs",
            GroupKind::Errors => "errors",
        };
        ParameterGroup {
            info: ElementInfo::new(identifier),
            kind,
            parameters,
        }
    }

    pub fn find(&self, identifier: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.info.identifier == identifier)
    }
}

/// A documented routine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(flatten)]
    pub info: ElementInfo,
    /// Classification read from the thematic grid marker.
    #[serde(default)]
    pub grid_name: Option<String>,
    #[serde(default)]
    pub inputs: Option<ParameterGroup>,
    #[serde(default)]
    pub outputs: Option<ParameterGroup>,
    #[serde(default)]
    pub errors: Vec<ParameterGroup>,
    /// Comment tags kept verbatim because nothing in the signature owns them.
    #[serde(default)]
    pub additional_tags: Vec<Segment>,
}

impl Operation {
    pub fn new(identifier: &str) -> Self {
        Operation {
            info: ElementInfo::new(identifier),
            ..Operation::default()
        }
    }

    pub fn with_inputs(mut self, parameters: Vec<Parameter>) -> Self {
        self.inputs = Some(ParameterGroup::new(GroupKind::Inputs, parameters));
        self
    }

    pub fn with_output(mut self, parameter: Parameter) -> Self {
        self.outputs = Some(ParameterGroup::new(GroupKind::Outputs, vec![parameter]));
        self
    }

    pub fn with_errors(mut self, parameters: Vec<Parameter>) -> Self {
        self.errors
            .push(ParameterGroup::new(GroupKind::Errors, parameters));
        self
    }

    pub fn with_grid(mut self, grid_name: &str) -> Self {
        self.grid_name = Some(grid_name.to_string());
        self
    }

    pub fn documented(mut self, doc: Documentation) -> Self {
        self.info.documentations.push(doc);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.info.identifier
    }

    pub fn find_input(&self, identifier: &str) -> Option<&Parameter> {
        self.inputs.as_ref().and_then(|g| g.find(identifier))
    }

    /// The sole output parameter, if the operation returns anything.
    pub fn return_parameter(&self) -> Option<&Parameter> {
        self.outputs.as_ref().and_then(|g| g.parameters.first())
    }

    pub fn find_error(&self, identifier: &str) -> Option<&Parameter> {
        self.errors.iter().find_map(|g| g.find(identifier))
    }

    /// All top-level parameters: inputs, then outputs, then errors.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.errors.iter())
            .flat_map(|g| g.parameters.iter())
    }

    pub fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .chain(self.errors.iter_mut())
            .flat_map(|g| g.parameters.iter_mut())
    }

    pub fn find_by_path(&self, path: &IdentifierPath, delimiters: &Delimiters) -> Option<&Parameter> {
        self.parameters()
            .find_map(|p| p.find_by_path(path, delimiters))
    }

    pub fn find_by_path_mut(
        &mut self,
        path: &IdentifierPath,
        delimiters: &Delimiters,
    ) -> Option<&mut Parameter> {
        self.parameters_mut()
            .find_map(|p| p.find_by_path_mut(path, delimiters))
    }
}

/// Interfaces may nest other interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interface {
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub additional_tags: Vec<Segment>,
}

/// Root of the tree; one per source file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(flatten)]
    pub info: ElementInfo,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
}

/// Any node of the documentable tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum SignatureElement {
    Artifact(Artifact),
    Interface(Interface),
    Operation(Operation),
    ParameterGroup(ParameterGroup),
    Parameter(Parameter),
}

impl SignatureElement {
    pub fn info(&self) -> &ElementInfo {
        match self {
            SignatureElement::Artifact(a) => &a.info,
            SignatureElement::Interface(i) => &i.info,
            SignatureElement::Operation(o) => &o.info,
            SignatureElement::ParameterGroup(g) => &g.info,
            SignatureElement::Parameter(p) => &p.info,
        }
    }

    pub fn documentations(&self) -> &[Documentation] {
        &self.info().documentations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Parameter {
        Parameter::new("p", "Person").with_attribute(
            Parameter::new("first", "String").documented(Documentation::new(None)),
        )
    }

    #[test]
    fn texts_and_sequence_stay_in_sync() {
        let dev = Addressee::primary();
        let mut doc = Documentation::new(None);
        doc.append_text(&dev, "a");
        doc.append_text(&dev, "b");
        doc.set_text(&Addressee::new("Manager"), "");
        assert_eq!(doc.addressees.len(), 2);
        assert_eq!(doc.text_for("Developer"), "ab");
        assert_eq!(doc.text_for("Manager"), "");
        assert_eq!(doc.text_for("Tester"), "");
        assert!(doc.is_consistent());
    }

    #[test]
    fn error_case_requires_failable_role() {
        let mut doc = Documentation::new(Some(ThematicRole::new("SOURCE")));
        doc.set_error_case(true);
        assert!(!doc.error_case);

        let mut doc = Documentation::new(Some(ThematicRole::new("REPORT").failable()));
        doc.set_error_case(true);
        assert!(doc.error_case);
    }

    #[test]
    fn introduction_only_without_operation() {
        let untyped = Documentation::new(None);
        let none = Documentation::new(Some(ThematicRole::new(ROLE_NONE)));
        let object = Documentation::new(Some(ThematicRole::new("OBJECT")));
        assert!(is_introduction(&untyped, false));
        assert!(is_introduction(&none, false));
        assert!(!is_introduction(&untyped, true));
        assert!(!is_introduction(&object, false));
        assert_eq!(role_name(&untyped), "");
        assert_eq!(role_name(&object), "OBJECT");
    }

    #[test]
    fn attribute_paths_derive_from_parent() {
        let p = person();
        assert_eq!(p.path, "p:Person");
        assert_eq!(p.attributes[0].path, "p:Person/first:String");
    }

    #[test]
    fn walk_follows_chain() {
        let p = person();
        assert_eq!(p.walk(&["first"]).map(|a| a.identifier()), Some("first"));
        assert!(p.walk(&["last"]).is_none());
    }

    #[test]
    fn find_by_path_is_structural() {
        let op = Operation::new("check").with_inputs(vec![person()]);
        let d = Delimiters::default();
        let found = op.find_by_path(&IdentifierPath::parse("p/first", &d), &d);
        assert_eq!(found.map(|p| p.identifier()), Some("first"));
        assert!(op.find_by_path(&IdentifierPath::parse("p/last", &d), &d).is_none());
    }

    #[test]
    fn return_parameter_is_first_output() {
        let op = Operation::new("get").with_output(Parameter::new("result", "Person"));
        assert_eq!(op.return_parameter().map(|p| p.identifier()), Some("result"));
        assert!(Operation::new("run").return_parameter().is_none());
    }

    #[test]
    fn signature_element_from_json() {
        let json = r#"{
            "element": "operation",
            "identifier": "check",
            "grid_name": "Checking Operations",
            "inputs": { "identifier": "inputs", "kind": "inputs",
                        "parameters": [ { "identifier": "p", "type_name": "String", "path": "p:String" } ] }
        }"#;
        let element: SignatureElement = serde_json::from_str(json).unwrap();
        match element {
            SignatureElement::Operation(op) => {
                assert_eq!(op.identifier(), "check");
                assert_eq!(op.find_input("p").map(|p| p.path.as_str()), Some("p:String"));
            }
            other => panic!("unexpected element: {:?}", other),
        }
    }
}
