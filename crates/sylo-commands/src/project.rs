//! Project commands
//!
//! Projects live in the `projects` collection. Budgets, statuses and
//! priorities are checked by the parameter schema before any handler runs.

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use sylo_core::handler::{CommandContext, CommandHandler, Typed, TypedCommand};
use sylo_core::model::ParameterSchema;
use sylo_core::rules::validation::ValidationResult;
use sylo_store::{Document, DocumentStore, ListFilter};

pub const PROJECT_COLLECTION: &str = "projects";

pub const STATUSES: [&str; 6] = [
    "planning",
    "in_progress",
    "review",
    "completed",
    "on_hold",
    "cancelled",
];

pub const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

const DEFAULT_PAGE_SIZE: usize = 10;

fn budget_check(min: Option<f64>, max: Option<f64>) -> ValidationResult {
    match (min, max) {
        (Some(min), Some(max)) if min > max => {
            ValidationResult::invalid("Minimum budget cannot be greater than maximum budget")
        }
        _ => ValidationResult::ok(),
    }
}

fn id_param() -> ParameterSchema {
    ParameterSchema::string("id").required().describe("Project ID")
}

/// Fields shared by create and update
fn project_fields() -> Vec<ParameterSchema> {
    vec![
        ParameterSchema::string("description").describe("Project description"),
        ParameterSchema::string("status")
            .describe("Project status")
            .one_of(STATUSES),
        ParameterSchema::string("priority")
            .describe("Project priority")
            .one_of(PRIORITIES),
        ParameterSchema::string("client_id").describe("Client ID"),
        ParameterSchema::number("budget_min")
            .describe("Minimum budget")
            .min(0.0),
        ParameterSchema::number("budget_max")
            .describe("Maximum budget")
            .min(0.0),
        ParameterSchema::string("start_date")
            .describe("Project start date (YYYY-MM-DD)")
            .pattern(r"^\d{4}-\d{2}-\d{2}$"),
        ParameterSchema::string("target_completion_date")
            .describe("Target completion date (YYYY-MM-DD)")
            .pattern(r"^\d{4}-\d{2}-\d{2}$"),
        ParameterSchema::string("assigned_to").describe("User ID to assign project to"),
        ParameterSchema::array("team_members").describe("Array of user IDs for team members"),
    ]
}

fn not_found(id: &str) -> anyhow::Error {
    anyhow!("Project '{id}' not found")
}

// ---------- create_project ----------

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateProjectParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_completion_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<String>>,
}

pub struct CreateProject {
    store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl TypedCommand for CreateProject {
    type Params = CreateProjectParams;
    type Output = Document;

    fn name(&self) -> &str {
        "create_project"
    }

    fn description(&self) -> &str {
        "Create a new project"
    }

    fn parameters(&self) -> Vec<ParameterSchema> {
        let mut params = vec![ParameterSchema::string("name")
            .required()
            .describe("Project name")
            .min(1.0)
            .max(255.0)];
        params.extend(project_fields());
        params
    }

    fn validate(&self, params: &CreateProjectParams) -> ValidationResult {
        budget_check(params.budget_min, params.budget_max)
    }

    async fn run(&self, mut params: CreateProjectParams, ctx: &CommandContext) -> anyhow::Result<Document> {
        let creator = ctx.user().id.clone();
        params
            .team_members
            .get_or_insert_with(|| vec![creator.clone()]);
        params.status.get_or_insert_with(|| "planning".to_string());
        params.priority.get_or_insert_with(|| "medium".to_string());

        let mut body = match serde_json::to_value(&params)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        body.insert("created_by".to_string(), Value::String(creator));

        let doc = self.store.insert(PROJECT_COLLECTION, body).await?;
        tracing::debug!(
            component = module_path!(),
            op = "create_project",
            request_id = ctx.request_id(),
            project_id = %doc.id,
        );
        Ok(doc)
    }
}

pub fn create_project(store: Arc<dyn DocumentStore>) -> Typed<CreateProject> {
    Typed::new(CreateProject { store })
}

// ---------- get_project ----------

#[derive(Debug, Deserialize)]
pub struct ProjectIdParams {
    pub id: String,
}

pub struct GetProject {
    store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl TypedCommand for GetProject {
    type Params = ProjectIdParams;
    type Output = Document;

    fn name(&self) -> &str {
        "get_project"
    }

    fn description(&self) -> &str {
        "Get project details by ID"
    }

    fn parameters(&self) -> Vec<ParameterSchema> {
        vec![id_param()]
    }

    async fn run(&self, params: ProjectIdParams, _ctx: &CommandContext) -> anyhow::Result<Document> {
        self.store
            .get(PROJECT_COLLECTION, &params.id)
            .await?
            .ok_or_else(|| not_found(&params.id))
    }
}

pub fn get_project(store: Arc<dyn DocumentStore>) -> Typed<GetProject> {
    Typed::new(GetProject { store })
}

// ---------- list_projects ----------

#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub client_id: Option<String>,
    pub assigned_to: Option<String>,
    pub search: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectPage {
    pub projects: Vec<Document>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

pub struct ListProjects {
    store: Arc<dyn DocumentStore>,
}

impl ListProjects {
    fn matches_search(doc: &Document, needle: &str) -> bool {
        ["name", "description"].iter().any(|field| {
            doc.body
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(needle))
        })
    }
}

#[async_trait]
impl TypedCommand for ListProjects {
    type Params = ListProjectsParams;
    type Output = ProjectPage;

    fn name(&self) -> &str {
        "list_projects"
    }

    fn description(&self) -> &str {
        "List projects with optional filtering and pagination"
    }

    fn parameters(&self) -> Vec<ParameterSchema> {
        vec![
            ParameterSchema::number("page")
                .describe("Page number (default: 1)")
                .min(1.0),
            ParameterSchema::number("limit")
                .describe("Items per page (default: 10, max: 100)")
                .min(1.0)
                .max(100.0),
            ParameterSchema::string("status")
                .describe("Filter by project status")
                .one_of(STATUSES),
            ParameterSchema::string("priority")
                .describe("Filter by priority")
                .one_of(PRIORITIES),
            ParameterSchema::string("client_id").describe("Filter by client ID"),
            ParameterSchema::string("assigned_to").describe("Filter by assigned user ID"),
            ParameterSchema::string("search").describe("Search in project name and description"),
            ParameterSchema::string("sort_order")
                .describe("Sort order by creation time")
                .one_of(["asc", "desc"]),
        ]
    }

    async fn run(&self, params: ListProjectsParams, _ctx: &CommandContext) -> anyhow::Result<ProjectPage> {
        let mut filter = ListFilter::new();
        for (field, value) in [
            ("status", &params.status),
            ("priority", &params.priority),
            ("client_id", &params.client_id),
            ("assigned_to", &params.assigned_to),
        ] {
            if let Some(value) = value {
                filter = filter.field_eq(field, json!(value));
            }
        }

        let mut projects = self.store.list(PROJECT_COLLECTION, &filter).await?;
        if let Some(search) = params.search.as_deref().map(str::to_lowercase) {
            projects.retain(|doc| Self::matches_search(doc, &search));
        }
        if params.sort_order.as_deref() == Some("desc") {
            projects.reverse();
        }

        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let total = projects.len();
        let projects = projects
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Ok(ProjectPage {
            projects,
            page,
            limit,
            total,
        })
    }
}

pub fn list_projects(store: Arc<dyn DocumentStore>) -> Typed<ListProjects> {
    Typed::new(ListProjects { store })
}

// ---------- update_project ----------

/// Partial update over the raw parameter bag, so absent and `null` fields can
/// be told apart
pub struct UpdateProject {
    store: Arc<dyn DocumentStore>,
    schema: Vec<ParameterSchema>,
}

impl UpdateProject {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let mut schema = vec![
            id_param(),
            ParameterSchema::string("name")
                .describe("Project name")
                .min(1.0)
                .max(255.0),
        ];
        schema.extend(project_fields());
        Self { store, schema }
    }
}

#[async_trait]
impl CommandHandler for UpdateProject {
    fn name(&self) -> &str {
        "update_project"
    }

    fn description(&self) -> &str {
        "Update an existing project"
    }

    fn parameters(&self) -> &[ParameterSchema] {
        &self.schema
    }

    fn validate(&self, parameters: &Map<String, Value>) -> ValidationResult {
        let number = |key: &str| parameters.get(key).and_then(Value::as_f64);
        budget_check(number("budget_min"), number("budget_max"))
    }

    async fn execute(&self, parameters: &Map<String, Value>, ctx: &CommandContext) -> anyhow::Result<Value> {
        let mut patch = parameters.clone();
        let id = match patch.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(anyhow!("Project id must be a string")),
        };
        patch.retain(|key, _| self.schema.iter().any(|p| p.name == *key));
        patch.insert("updated_by".to_string(), Value::String(ctx.user().id.clone()));

        let doc = self
            .store
            .update(PROJECT_COLLECTION, &id, patch)
            .await?
            .ok_or_else(|| not_found(&id))?;
        Ok(doc.to_value())
    }
}

// ---------- delete_project ----------

pub struct DeleteProject {
    store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl TypedCommand for DeleteProject {
    type Params = ProjectIdParams;
    type Output = Value;

    fn name(&self) -> &str {
        "delete_project"
    }

    fn description(&self) -> &str {
        "Delete a project"
    }

    fn parameters(&self) -> Vec<ParameterSchema> {
        vec![id_param()]
    }

    async fn run(&self, params: ProjectIdParams, ctx: &CommandContext) -> anyhow::Result<Value> {
        if !self.store.delete(PROJECT_COLLECTION, &params.id).await? {
            return Err(not_found(&params.id));
        }
        tracing::info!(
            component = module_path!(),
            op = "delete_project",
            request_id = ctx.request_id(),
            user_id = %ctx.user().id,
            project_id = %params.id,
        );
        Ok(json!({ "id": params.id, "deleted": true }))
    }
}

pub fn delete_project(store: Arc<dyn DocumentStore>) -> Typed<DeleteProject> {
    Typed::new(DeleteProject { store })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_check() {
        assert_eq!(
            budget_check(Some(10.0), Some(5.0)).errors,
            vec!["Minimum budget cannot be greater than maximum budget"]
        );
        assert!(budget_check(Some(5.0), Some(10.0)).valid);
        assert!(budget_check(Some(5.0), None).valid);
        assert!(budget_check(None, None).valid);
    }

    #[test]
    fn test_create_and_update_share_fields() {
        let store: Arc<dyn DocumentStore> = Arc::new(sylo_store::MemoryBackend::new());
        let create = create_project(store.clone());
        let update = UpdateProject::new(store);
        for field in project_fields() {
            assert!(create.parameters().iter().any(|p| p.name == field.name));
            assert!(update.parameters().iter().any(|p| p.name == field.name));
        }
        assert!(create.parameters().iter().any(|p| p.name == "name" && p.required));
        assert!(update.parameters().iter().any(|p| p.name == "name" && !p.required));
    }
}
