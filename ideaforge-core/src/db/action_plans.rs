use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::ideas::sql_limit;
use super::{classify_write, decode_enum, decode_time, decode_uuid, encode_time, Database, DbError};
use crate::models::{ActionPlan, ActionPlanMessage, MessageRole, StageStatus};
use crate::ports::ActionPlanRepository;

const PLAN_COLUMNS: &str = "id, idea_id, status, functional_requirements, \
     non_functional_requirements, business_logic_flow, completed, created_at, updated_at";

fn row_to_plan(row: &Row) -> rusqlite::Result<ActionPlan> {
    Ok(ActionPlan {
        id: decode_uuid(0, row.get(0)?)?,
        idea_id: decode_uuid(1, row.get(1)?)?,
        status: decode_enum(2, row.get(2)?, StageStatus::from_str)?,
        functional_requirements: row.get(3)?,
        non_functional_requirements: row.get(4)?,
        business_logic_flow: row.get(5)?,
        completed: row.get(6)?,
        created_at: decode_time(7, row.get(7)?)?,
        updated_at: decode_time(8, row.get(8)?)?,
    })
}

fn row_to_message(row: &Row) -> rusqlite::Result<ActionPlanMessage> {
    Ok(ActionPlanMessage {
        id: decode_uuid(0, row.get(0)?)?,
        action_plan_id: decode_uuid(1, row.get(1)?)?,
        role: decode_enum(2, row.get(2)?, MessageRole::from_str)?,
        content: row.get(3)?,
        created_at: decode_time(4, row.get(4)?)?,
    })
}

impl ActionPlanRepository for Database {
    fn save_action_plan(&self, plan: &ActionPlan) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                &format!("INSERT INTO action_plans ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)", PLAN_COLUMNS),
                params![
                    plan.id.to_string(),
                    plan.idea_id.to_string(),
                    plan.status.as_str(),
                    plan.functional_requirements,
                    plan.non_functional_requirements,
                    plan.business_logic_flow,
                    plan.completed,
                    encode_time(&plan.created_at),
                    encode_time(&plan.updated_at),
                ],
            )
            .map_err(|e| classify_write(e, "Action plan", "Idea"))?;
            Ok(())
        })
    }

    fn find_action_plan(&self, id: Uuid) -> Result<Option<ActionPlan>, DbError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM action_plans WHERE id = ?1", PLAN_COLUMNS),
                    [id.to_string()],
                    row_to_plan,
                )
                .optional()?)
        })
    }

    fn find_action_plan_by_idea(&self, idea_id: Uuid) -> Result<Option<ActionPlan>, DbError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM action_plans WHERE idea_id = ?1", PLAN_COLUMNS),
                    [idea_id.to_string()],
                    row_to_plan,
                )
                .optional()?)
        })
    }

    fn update_action_plan(&self, plan: &ActionPlan) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                r#"UPDATE action_plans
                   SET status = ?2, functional_requirements = ?3,
                       non_functional_requirements = ?4, business_logic_flow = ?5,
                       completed = ?6, updated_at = ?7
                   WHERE id = ?1"#,
                params![
                    plan.id.to_string(),
                    plan.status.as_str(),
                    plan.functional_requirements,
                    plan.non_functional_requirements,
                    plan.business_logic_flow,
                    plan.completed,
                    encode_time(&plan.updated_at),
                ],
            )?;
            Ok(rows > 0)
        })
    }

    fn delete_action_plan(&self, id: Uuid) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let rows = conn.execute("DELETE FROM action_plans WHERE id = ?1", [id.to_string()])?;
            Ok(rows > 0)
        })
    }

    fn append_action_plan_message(&self, msg: &ActionPlanMessage) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                r#"INSERT INTO action_plan_messages (id, action_plan_id, role, content, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    msg.id.to_string(),
                    msg.action_plan_id.to_string(),
                    msg.role.as_str(),
                    msg.content,
                    encode_time(&msg.created_at),
                ],
            )
            .map_err(|e| classify_write(e, "Message", "Action plan"))?;
            Ok(())
        })
    }

    fn list_action_plan_messages(
        &self,
        action_plan_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActionPlanMessage>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT id, action_plan_id, role, content, created_at
                   FROM action_plan_messages WHERE action_plan_id = ?1
                   ORDER BY created_at ASC, rowid ASC LIMIT ?2"#,
            )?;
            let messages = stmt
                .query_map(params![action_plan_id.to_string(), sql_limit(limit)], row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
    }
}
