use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// 検索APIのレスポンス
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResponse {
    pub issues: Vec<Issue>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub status: Option<StatusField>,
    pub parent: Option<ParentIssue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusField {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentIssue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fields: Option<ParentFields>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentFields {
    #[serde(default)]
    pub summary: Option<String>,
}

impl Issue {
    pub fn summary(&self) -> Option<&str> {
        self.fields.summary.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.status.as_ref().map(|s| s.name.as_str())
    }

    pub fn parent_summary(&self) -> Option<&str> {
        self.fields
            .parent
            .as_ref()
            .and_then(|p| p.fields.as_ref())
            .and_then(|f| f.summary.as_deref())
    }
}

/// 課題作成APIのレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
}

/// 作成する課題の内容
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub project_key: String,
    pub summary: String,
    pub issue_type: String,
    pub description: Value,
    pub assignee: Option<String>,
    pub priority_id: Option<String>,
}

impl NewIssue {
    /// 課題作成APIのリクエストボディを生成
    pub fn to_payload(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("summary".into(), json!(self.summary));
        fields.insert("project".into(), json!({ "key": self.project_key }));
        fields.insert("issuetype".into(), json!({ "name": self.issue_type }));
        fields.insert("description".into(), self.description.clone());

        if let Some(assignee) = &self.assignee {
            fields.insert("assignee".into(), json!({ "name": assignee }));
        }
        if let Some(priority) = &self.priority_id {
            fields.insert("priority".into(), json!({ "id": priority }));
        }

        json!({ "fields": fields })
    }
}
