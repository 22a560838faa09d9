//! Role and addressee catalog.

use crate::model::{Addressee, ThematicRole, PRIMARY_ADDRESSEE};
use serde::{Deserialize, Serialize};

/// Supplies canonical roles and addressees by name.
pub trait Registry {
    fn find_role(&self, name: &str) -> Option<ThematicRole>;
    fn find_addressee(&self, name: &str) -> Option<Addressee>;
    fn roles(&self) -> Vec<ThematicRole>;
    fn addressees(&self) -> Vec<Addressee>;

    /// The audience the compact format writes for.
    fn primary_addressee(&self) -> Addressee {
        self.addressees()
            .into_iter()
            .find(|a| a.primary)
            .unwrap_or_else(Addressee::primary)
    }
}

const BUILTIN_ROLES: &[(&str, &str, bool)] = &[
    ("NONE", "No particular kind of information.", false),
    ("ACTION", "What the operation does.", false),
    ("RULE", "A condition the operation checks or enforces.", false),
    ("OBJECT", "The thing the operation works on.", false),
    ("SOURCE", "Where data comes from.", true),
    ("ATTRIBUTE", "A property of the object.", false),
    ("COMPARISON", "What a value is compared against.", false),
    ("DESTINATION", "Where data goes to.", true),
    ("FORMAT", "How data is represented.", false),
    ("ORDERING", "How results are sorted.", false),
    ("REPORT", "What is reported back, including failures.", true),
    ("FACTORY", "What creates the result.", false),
    ("INSTRUMENT", "What is used to carry out the action.", false),
];

const BUILTIN_ADDRESSEES: &[(&str, &str)] = &[
    (PRIMARY_ADDRESSEE, "Implements or calls the interface."),
    ("Architect", "Designs the system the interface belongs to."),
    ("Manager", "Decides on the use of the interface."),
];

/// In-memory catalog, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub roles: Vec<ThematicRole>,
    #[serde(default)]
    pub addressees: Vec<Addressee>,
}

impl Catalog {
    pub fn new(roles: Vec<ThematicRole>, addressees: Vec<Addressee>) -> Self {
        Catalog { roles, addressees }
    }

    /// The roles and addressees every installation starts with.
    pub fn builtin() -> Self {
        let roles = BUILTIN_ROLES
            .iter()
            .map(|&(name, description, failable)| ThematicRole {
                name: name.to_string(),
                description: description.to_string(),
                failable,
            })
            .collect();
        let addressees = BUILTIN_ADDRESSEES
            .iter()
            .map(|&(name, description)| Addressee {
                description: description.to_string(),
                ..Addressee::new(name)
            })
            .collect();
        Catalog { roles, addressees }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Registry for Catalog {
    fn find_role(&self, name: &str) -> Option<ThematicRole> {
        find_role_by_name(&self.roles, name).cloned()
    }

    fn find_addressee(&self, name: &str) -> Option<Addressee> {
        find_addressee_by_name(&self.addressees, name).cloned()
    }

    fn roles(&self) -> Vec<ThematicRole> {
        self.roles.clone()
    }

    fn addressees(&self) -> Vec<Addressee> {
        self.addressees.clone()
    }
}

/// Role lookup ignores case; tags carry role names lower-cased.
pub fn find_role_by_name<'a>(roles: &'a [ThematicRole], name: &str) -> Option<&'a ThematicRole> {
    let name = name.trim();
    roles.iter().find(|r| r.name.eq_ignore_ascii_case(name))
}

pub fn find_addressee_by_name<'a>(addressees: &'a [Addressee], name: &str) -> Option<&'a Addressee> {
    let name = name.trim();
    addressees.iter().find(|a| a.name.eq_ignore_ascii_case(name))
}
