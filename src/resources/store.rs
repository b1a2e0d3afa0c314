//! Resource Storage
//! Mission: Persist projects and tasks with SQLite

use crate::resources::models::{Project, Task, TaskStatus};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Project/task storage with SQLite backend.
///
/// Pure data-shuffling: ownership decisions live in the authorizer, this
/// store only records the `owner_id` written at creation.
pub struct ResourceStore {
    db_path: String,
}

const PROJECT_COLUMNS: &str = "id, name, description, owner_id, created_at";
const TASK_COLUMNS: &str = "id, project_id, title, description, status, owner_id, created_at";

impl ResourceStore {
    /// Create a new resource store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                owner_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    // ===== Projects =====

    pub fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: description.map(|d| d.to_string()),
            owner_id,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO projects (id, name, description, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id.to_string(),
                project.name,
                project.description,
                project.owner_id.to_string(),
                project.created_at,
            ],
        )
        .context("Failed to insert project")?;

        info!("Created project {} for {}", project.id, owner_id);
        Ok(project)
    }

    /// All projects owned by an identity, newest first.
    pub fn projects_for_owner(&self, owner_id: Uuid) -> Result<Vec<Project>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = ?1
             ORDER BY created_at DESC"
        ))?;

        let projects = stmt
            .query_map(params![owner_id.to_string()], project_row_to_columns)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(project_from_columns)
            .collect::<Result<Vec<_>>>()?;

        Ok(projects)
    }

    pub fn find_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"
        ))?;

        let row = stmt.query_row(params![id.to_string()], project_row_to_columns);
        match row {
            Ok(columns) => Ok(Some(project_from_columns(columns)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a project row. Orphaned tasks are left for external cleanup;
    /// they become unreachable because the parent-level ownership gate can
    /// no longer pass.
    pub fn delete_project(&self, id: Uuid) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "DELETE FROM projects WHERE id = ?1",
            params![id.to_string()],
        )?;

        info!("Deleted project {}", id);
        Ok(())
    }

    // ===== Tasks =====

    pub fn create_task(
        &self,
        project_id: Uuid,
        title: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Task> {
        let task = Task {
            id: Uuid::new_v4(),
            project_id,
            title: title.trim().to_string(),
            description: description.map(|d| d.to_string()),
            status: TaskStatus::Todo,
            owner_id,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO tasks (id, project_id, title, description, status, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.title,
                task.description,
                task.status.as_str(),
                task.owner_id.to_string(),
                task.created_at,
            ],
        )
        .context("Failed to insert task")?;

        Ok(task)
    }

    /// Tasks under a project, newest first.
    pub fn tasks_for_project(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ?1
             ORDER BY created_at DESC"
        ))?;

        let tasks = stmt
            .query_map(params![project_id.to_string()], task_row_to_columns)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(task_from_columns)
            .collect::<Result<Vec<_>>>()?;

        Ok(tasks)
    }

    pub fn find_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;

        let row = stmt.query_row(params![id.to_string()], task_row_to_columns);
        match row {
            Ok(columns) => Ok(Some(task_from_columns(columns)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_task_status(&self, id: Uuid, status: TaskStatus) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.to_string()],
        )?;
        Ok(())
    }

    pub fn delete_task(&self, id: Uuid) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}

type ProjectColumns = (String, String, Option<String>, String, String);
type TaskColumns = (
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
);

fn project_row_to_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn project_from_columns(
    (id, name, description, owner_id, created_at): ProjectColumns,
) -> Result<Project> {
    Ok(Project {
        id: Uuid::parse_str(&id).context("Corrupt project id")?,
        name,
        description,
        owner_id: Uuid::parse_str(&owner_id).context("Corrupt project owner id")?,
        created_at,
    })
}

fn task_row_to_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn task_from_columns(
    (id, project_id, title, description, status, owner_id, created_at): TaskColumns,
) -> Result<Task> {
    Ok(Task {
        id: Uuid::parse_str(&id).context("Corrupt task id")?,
        project_id: Uuid::parse_str(&project_id).context("Corrupt task project id")?,
        title,
        description,
        status: TaskStatus::from_str(&status).ok_or_else(|| anyhow!("Corrupt task status"))?,
        owner_id: Uuid::parse_str(&owner_id).context("Corrupt task owner id")?,
        created_at,
    })
}
