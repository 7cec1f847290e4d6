// crates/todos-contract/src/scenario.rs
// ============================================================================
// Module: Contract Scenarios
// Description: The todos API contract expressed as one scenario table.
// Purpose: Single source of truth for requests and expected responses.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each [`ContractScenario`] declares its fixture and an ordered list of
//! [`ContractStep`]s. The runner owns setup, bookkeeping, and teardown, so
//! the table only states what is sent and what must come back.
//!
//! Titles here are unscoped; the runner applies the run tag on the way out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::expectation::BodyExpectation;
use crate::expectation::ResponseExpectation;
use crate::http::ApiMethod;
use crate::model::TodoField;
use crate::model::TodoFields;

// ============================================================================
// SECTION: Contract Literals
// ============================================================================

/// Body returned when create is called without parameters.
pub const MISSING_PARAMETERS_MESSAGE: &str =
    "You must provide the following parameters: <title> and <due>.";
/// Body returned when POST targets an item.
pub const POST_TO_ITEM_MESSAGE: &str =
    "Method Not Allowed. To create a new todo, POST to the collection, not an item within it.";
/// Body returned when DELETE targets the collection.
pub const DELETE_COLLECTION_MESSAGE: &str = "Method Not Allowed. You cannot delete the Collection.";

/// Title used for fixtures.
const SEED_TITLE: &str = "Contract suite fixture";
/// Due date used for fixtures.
const SEED_DUE: &str = "2015-11-27";
/// Title written by replace and update.
const CHANGED_TITLE: &str = "Title has been changed!";
/// Due date written by replace.
const CHANGED_DUE: &str = "2016-03-26";
/// Title sent at todos that no longer exist.
const STRAY_TITLE: &str = "This ain't gonna work!";
/// Due date sent at todos that no longer exist.
const STRAY_DUE: &str = "2020-10-10";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scenario grouping by the HTTP verb under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioGroup {
    /// POST scenarios.
    Create,
    /// GET scenarios.
    Read,
    /// PUT scenarios.
    Replace,
    /// PATCH scenarios.
    Update,
    /// DELETE scenarios.
    Delete,
}

impl ScenarioGroup {
    /// All groups in table order.
    pub const ALL: [Self; 5] = [Self::Create, Self::Read, Self::Replace, Self::Update, Self::Delete];

    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Replace => "replace",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ScenarioGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioGroup {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown scenario group: {value}"))
    }
}

/// Resource prepared before a scenario's steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fixture {
    /// No setup.
    None,
    /// A todo created from the seed fields and left in place.
    Live,
    /// A todo created from the seed fields and then deleted.
    Deleted,
}

impl Fixture {
    /// Returns true when the fixture yields an identifier.
    #[must_use]
    pub const fn has_item(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Endpoint a step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The collection URL.
    Collection,
    /// The fixture's item URL.
    Fixture,
}

/// One request and its expected response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractStep {
    /// Short label used in reports.
    pub label: &'static str,
    /// HTTP method.
    pub method: ApiMethod,
    /// Target endpoint.
    pub target: Target,
    /// Query parameters.
    pub params: TodoFields,
    /// Expected response.
    pub expect: ResponseExpectation,
}

impl ContractStep {
    /// Builds a step without parameters.
    #[must_use]
    pub const fn new(
        label: &'static str,
        method: ApiMethod,
        target: Target,
        expect: ResponseExpectation,
    ) -> Self {
        Self {
            label,
            method,
            target,
            params: TodoFields::none(),
            expect,
        }
    }

    /// Attaches query parameters.
    #[must_use]
    pub fn with_params(mut self, params: TodoFields) -> Self {
        self.params = params;
        self
    }
}

/// A named contract scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractScenario {
    /// Unique scenario name.
    pub name: &'static str,
    /// Verb group.
    pub group: ScenarioGroup,
    /// One-line description of the behavior checked.
    pub summary: &'static str,
    /// Setup fixture.
    pub fixture: Fixture,
    /// Fields used to create the fixture.
    pub seed: TodoFields,
    /// Ordered steps.
    pub steps: Vec<ContractStep>,
}

impl ContractScenario {
    /// Builds a scenario with the default seed fields.
    fn new(
        name: &'static str,
        group: ScenarioGroup,
        summary: &'static str,
        fixture: Fixture,
        steps: Vec<ContractStep>,
    ) -> Self {
        Self {
            name,
            group,
            summary,
            fixture,
            seed: TodoFields::full(SEED_TITLE, SEED_DUE),
            steps,
        }
    }

    /// Returns true when any step targets the fixture item.
    #[must_use]
    pub fn targets_fixture(&self) -> bool {
        self.steps.iter().any(|step| step.target == Target::Fixture)
    }
}

// ============================================================================
// SECTION: Scenario Table
// ============================================================================

/// Returns the full todos contract in execution order.
#[must_use]
pub fn contract_scenarios() -> Vec<ContractScenario> {
    let mut scenarios = create_scenarios();
    scenarios.extend(read_scenarios());
    scenarios.extend(replace_scenarios());
    scenarios.extend(update_scenarios());
    scenarios.extend(delete_scenarios());
    scenarios
}

/// Finds a scenario by name.
#[must_use]
pub fn find(name: &str) -> Option<ContractScenario> {
    contract_scenarios().into_iter().find(|scenario| scenario.name == name)
}

/// Returns the scenarios in a group.
#[must_use]
pub fn by_group(group: ScenarioGroup) -> Vec<ContractScenario> {
    contract_scenarios().into_iter().filter(|scenario| scenario.group == group).collect()
}

/// Follow-up read asserting the fixture's fields.
fn read_back(title: &str, due: &str) -> ContractStep {
    ContractStep::new(
        "read back",
        ApiMethod::Get,
        Target::Fixture,
        ResponseExpectation::ok()
            .with_body(BodyExpectation::field(TodoField::Title, title))
            .with_body(BodyExpectation::field(TodoField::Due, due)),
    )
}

/// POST scenarios.
fn create_scenarios() -> Vec<ContractScenario> {
    vec![
        ContractScenario::new(
            "create_in_collection",
            ScenarioGroup::Create,
            "POST to the collection creates a todo",
            Fixture::None,
            vec![
                ContractStep::new(
                    "create",
                    ApiMethod::Post,
                    Target::Collection,
                    ResponseExpectation::created()
                        .with_body(BodyExpectation::field(TodoField::Title, "Contract suite create"))
                        .with_body(BodyExpectation::FieldPresent(TodoField::Id)),
                )
                .with_params(TodoFields::full("Contract suite create", "2016-02-03")),
            ],
        ),
        ContractScenario::new(
            "create_without_parameters",
            ScenarioGroup::Create,
            "POST without title and due is rejected",
            Fixture::None,
            vec![ContractStep::new(
                "create without parameters",
                ApiMethod::Post,
                Target::Collection,
                ResponseExpectation::unprocessable()
                    .with_body(BodyExpectation::Contains(MISSING_PARAMETERS_MESSAGE.to_string())),
            )],
        ),
        ContractScenario::new(
            "create_on_item_rejected",
            ScenarioGroup::Create,
            "POST to an item URL is rejected",
            Fixture::Live,
            vec![
                ContractStep::new(
                    "post to item",
                    ApiMethod::Post,
                    Target::Fixture,
                    ResponseExpectation::method_not_allowed()
                        .with_body(BodyExpectation::Exact(POST_TO_ITEM_MESSAGE.to_string())),
                )
                .with_params(TodoFields::full("Contract suite misdirected", SEED_DUE)),
            ],
        ),
    ]
}

/// GET scenarios.
fn read_scenarios() -> Vec<ContractScenario> {
    vec![
        ContractScenario::new(
            "read_item",
            ScenarioGroup::Read,
            "GET on an item returns the todo",
            Fixture::Live,
            vec![ContractStep::new(
                "read",
                ApiMethod::Get,
                Target::Fixture,
                ResponseExpectation::ok()
                    .with_body(BodyExpectation::field(TodoField::Title, SEED_TITLE))
                    .with_body(BodyExpectation::field(TodoField::Due, SEED_DUE)),
            )],
        ),
        ContractScenario::new(
            "read_collection",
            ScenarioGroup::Read,
            "GET on the collection returns an array",
            Fixture::None,
            vec![ContractStep::new(
                "list",
                ApiMethod::Get,
                Target::Collection,
                ResponseExpectation::ok().with_body(BodyExpectation::Collection),
            )],
        ),
        ContractScenario::new(
            "read_missing_item",
            ScenarioGroup::Read,
            "GET on a deleted todo is not found",
            Fixture::Deleted,
            vec![
                ContractStep::new(
                    "read deleted",
                    ApiMethod::Get,
                    Target::Fixture,
                    ResponseExpectation::not_found(),
                )
                .with_params(TodoFields::full(STRAY_TITLE, STRAY_DUE)),
            ],
        ),
    ]
}

/// PUT scenarios.
fn replace_scenarios() -> Vec<ContractScenario> {
    vec![
        ContractScenario::new(
            "replace_item",
            ScenarioGroup::Replace,
            "PUT replaces both title and due",
            Fixture::Live,
            vec![
                ContractStep::new(
                    "replace",
                    ApiMethod::Put,
                    Target::Fixture,
                    ResponseExpectation::ok(),
                )
                .with_params(TodoFields::full(CHANGED_TITLE, CHANGED_DUE)),
                read_back(CHANGED_TITLE, CHANGED_DUE),
            ],
        ),
        ContractScenario::new(
            "replace_missing_item",
            ScenarioGroup::Replace,
            "PUT on a deleted todo is not found",
            Fixture::Deleted,
            vec![
                ContractStep::new(
                    "replace deleted",
                    ApiMethod::Put,
                    Target::Fixture,
                    ResponseExpectation::not_found(),
                )
                .with_params(TodoFields::full(STRAY_TITLE, STRAY_DUE)),
            ],
        ),
        ContractScenario::new(
            "replace_collection_rejected",
            ScenarioGroup::Replace,
            "PUT on the collection is rejected",
            Fixture::None,
            vec![ContractStep::new(
                "replace collection",
                ApiMethod::Put,
                Target::Collection,
                ResponseExpectation::method_not_allowed(),
            )],
        ),
    ]
}

/// PATCH scenarios.
fn update_scenarios() -> Vec<ContractScenario> {
    vec![
        ContractScenario::new(
            "update_item_partially",
            ScenarioGroup::Update,
            "PATCH changes only the fields sent",
            Fixture::Live,
            vec![
                ContractStep::new(
                    "update title",
                    ApiMethod::Patch,
                    Target::Fixture,
                    ResponseExpectation::ok(),
                )
                .with_params(TodoFields::title_only(CHANGED_TITLE)),
                read_back(CHANGED_TITLE, SEED_DUE),
            ],
        ),
        ContractScenario::new(
            "update_missing_item",
            ScenarioGroup::Update,
            "PATCH on a deleted todo is not found",
            Fixture::Deleted,
            vec![
                ContractStep::new(
                    "update deleted",
                    ApiMethod::Patch,
                    Target::Fixture,
                    ResponseExpectation::not_found(),
                )
                .with_params(TodoFields::title_only(STRAY_TITLE)),
            ],
        ),
        ContractScenario::new(
            "update_collection_rejected",
            ScenarioGroup::Update,
            "PATCH on the collection is rejected",
            Fixture::None,
            vec![ContractStep::new(
                "update collection",
                ApiMethod::Patch,
                Target::Collection,
                ResponseExpectation::method_not_allowed(),
            )],
        ),
    ]
}

/// DELETE scenarios.
fn delete_scenarios() -> Vec<ContractScenario> {
    vec![
        ContractScenario::new(
            "delete_item",
            ScenarioGroup::Delete,
            "DELETE removes a todo",
            Fixture::Live,
            vec![ContractStep::new(
                "delete",
                ApiMethod::Delete,
                Target::Fixture,
                ResponseExpectation::no_content(),
            )],
        ),
        ContractScenario::new(
            "delete_item_twice",
            ScenarioGroup::Delete,
            "A second DELETE of the same todo is not found",
            Fixture::Live,
            vec![
                ContractStep::new(
                    "first delete",
                    ApiMethod::Delete,
                    Target::Fixture,
                    ResponseExpectation::no_content(),
                ),
                ContractStep::new(
                    "second delete",
                    ApiMethod::Delete,
                    Target::Fixture,
                    ResponseExpectation::not_found(),
                ),
            ],
        ),
        ContractScenario::new(
            "delete_collection_rejected",
            ScenarioGroup::Delete,
            "DELETE on the collection is rejected",
            Fixture::None,
            vec![ContractStep::new(
                "delete collection",
                ApiMethod::Delete,
                Target::Collection,
                ResponseExpectation::method_not_allowed()
                    .with_body(BodyExpectation::Exact(DELETE_COLLECTION_MESSAGE.to_string())),
            )],
        ),
    ]
}
