//! Tag names of the compact format and documentation-tool options for them.

use crate::model::ThematicRole;

pub const PARAM: &str = "param";
pub const RETURN: &str = "return";
pub const THROWS: &str = "throws";
pub const THEMATIC_GRID: &str = "thematicgrid";

const INFO_SUFFIX: &str = "info";
const SUB_PREFIX: &str = "sub";

/// The three parameter blocks of an operation comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Param,
    Return,
    Throws,
}

impl Block {
    pub fn structural_tag(self) -> &'static str {
        match self {
            Block::Param => PARAM,
            Block::Return => RETURN,
            Block::Throws => THROWS,
        }
    }

    pub fn from_structural(tag: &str) -> Option<Block> {
        match tag {
            PARAM => Some(Block::Param),
            RETURN => Some(Block::Return),
            THROWS => Some(Block::Throws),
            _ => None,
        }
    }

    /// Tag for the `index`-th entry on a target: the structural tag first,
    /// continuations with the `info` suffix, nested targets with `sub`.
    pub fn tag_for(self, nested: bool, index: usize) -> String {
        let mut tag = String::new();
        if nested {
            tag.push_str(SUB_PREFIX);
        }
        tag.push_str(self.structural_tag());
        if index > 0 {
            tag.push_str(INFO_SUFFIX);
        }
        tag
    }
}

/// Custom tags beyond the documentation tool's built-in ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taglet {
    ParamInfo,
    ReturnInfo,
    ThrowsInfo,
    SubReturn,
    SubReturnInfo,
    SubParam,
    SubParamInfo,
    SubThrows,
    SubThrowsInfo,
    ThematicGrid,
}

impl Taglet {
    pub const ALL: [Taglet; 10] = [
        Taglet::ParamInfo,
        Taglet::ReturnInfo,
        Taglet::ThrowsInfo,
        Taglet::SubReturn,
        Taglet::SubReturnInfo,
        Taglet::SubParam,
        Taglet::SubParamInfo,
        Taglet::SubThrows,
        Taglet::SubThrowsInfo,
        Taglet::ThematicGrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Taglet::ParamInfo => "paraminfo",
            Taglet::ReturnInfo => "returninfo",
            Taglet::ThrowsInfo => "throwsinfo",
            Taglet::SubReturn => "subreturn",
            Taglet::SubReturnInfo => "subreturninfo",
            Taglet::SubParam => "subparam",
            Taglet::SubParamInfo => "subparaminfo",
            Taglet::SubThrows => "subthrows",
            Taglet::SubThrowsInfo => "subthrowsinfo",
            Taglet::ThematicGrid => THEMATIC_GRID,
        }
    }

    /// Headline in the exported documentation.
    pub fn header(self) -> &'static str {
        match self {
            Taglet::ParamInfo => "Parameter-Info",
            Taglet::ReturnInfo => "Return-Info",
            Taglet::ThrowsInfo => "Throw-Info",
            Taglet::SubReturn => "Subreturn",
            Taglet::SubReturnInfo => "Subreturn-Info",
            Taglet::SubParam => "Subparameter",
            Taglet::SubParamInfo => "Subparameter-Info",
            Taglet::SubThrows => "Subthrow",
            Taglet::SubThrowsInfo => "Subthrow-Info",
            Taglet::ThematicGrid => "Thematic Grid",
        }
    }

    pub fn from_name(name: &str) -> Option<Taglet> {
        Taglet::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Block of the structural tag this taglet continues; `None` for the grid.
    pub fn block(self) -> Option<Block> {
        match self {
            Taglet::ParamInfo | Taglet::SubParam | Taglet::SubParamInfo => Some(Block::Param),
            Taglet::ReturnInfo | Taglet::SubReturn | Taglet::SubReturnInfo => Some(Block::Return),
            Taglet::ThrowsInfo | Taglet::SubThrows | Taglet::SubThrowsInfo => Some(Block::Throws),
            Taglet::ThematicGrid => None,
        }
    }

    /// Sub tags name a dotted attribute chain before the role bracket.
    pub fn is_sub(self) -> bool {
        self.name().starts_with(SUB_PREFIX)
    }
}

/// What a tag name means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind<'a> {
    Structural(Block),
    Continuation(Taglet),
    Grid,
    /// A role tag or a tag nobody here knows.
    Other(&'a str),
}

pub fn classify(tag: &str) -> TagKind<'_> {
    if let Some(block) = Block::from_structural(tag) {
        return TagKind::Structural(block);
    }
    match Taglet::from_name(tag) {
        Some(Taglet::ThematicGrid) => TagKind::Grid,
        Some(taglet) => TagKind::Continuation(taglet),
        None => TagKind::Other(tag),
    }
}

/// Role names as tag names: lower-cased.
pub fn role_tag(role: &ThematicRole) -> String {
    role.name.to_lowercase()
}

/// `TIME_TO_LIVE` → `Time To Live`.
pub fn role_header(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Documentation-tool options declaring every custom tag and one tag per
/// role, e.g. `-tag paraminfo:tcm:"Parameter-Info:"`.
pub fn taglet_options(roles: &[ThematicRole]) -> String {
    let custom = Taglet::ALL
        .iter()
        .map(|t| tag_option(t.name(), t.header()));
    let per_role = roles
        .iter()
        .map(|r| tag_option(&role_tag(r), &role_header(&r.name)));
    custom.chain(per_role).collect::<Vec<_>>().join(" ")
}

fn tag_option(name: &str, header: &str) -> String {
    format!("-tag {}:tcm:\"{}:\"", name, header)
}
