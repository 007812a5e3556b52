// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    Board, ISSUE_PRIORITY, ISSUE_TYPE, IssueDraft, IssueFields, IssueTracker, Project, Sprint,
    TrackerContext, TrackerIssue, select_active_sprint,
};
use crate::{
    config::JiraConfig,
    errors::{HttpError, JiraError},
    http::{HttpAuth, HttpClient},
    step::StepLogger,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// The number of issues requested per search page.
const SEARCH_PAGE_SIZE: usize = 100;

/// Returns the JQL matching every open bug filed by `username`.
pub fn open_issues_jql(username: &str) -> String {
    format!("reporter = {username} and type = Bug and Status NOT IN (Resolved,Closed)")
}

/// A Jira client.
#[derive(Clone, Debug)]
pub struct JiraClient {
    http: HttpClient,
    project: String,
    board: String,
    component: Option<String>,
    username: String,
    steps: StepLogger,
}

impl JiraClient {
    /// Creates a new client.
    ///
    /// Requests are authenticated with HTTP basic auth when a password is configured, and are
    /// anonymous otherwise.
    pub fn new(config: &JiraConfig, timeout: Duration, steps: StepLogger) -> Result<Self, HttpError> {
        let auth = match &config.password {
            Some(password) => HttpAuth::Basic {
                username: config.username.clone(),
                password: password.clone(),
            },
            None => HttpAuth::Anonymous,
        };
        Ok(Self {
            http: HttpClient::new(config.base_url.clone(), timeout, auth)?,
            project: config.project.clone(),
            board: config.board.clone(),
            component: config.component.clone(),
            username: config.username.clone(),
            steps,
        })
    }

    fn project(&self) -> Result<Project, JiraError> {
        let url = self
            .http
            .endpoint(["rest", "api", "2", "project", self.project.as_str()]);
        self.http.get_json(&url).map_err(|err| JiraError::Project {
            project: self.project.clone(),
            err,
        })
    }

    fn board(&self, project_key: &str) -> Result<Board, JiraError> {
        let mut url = self.http.endpoint(["rest", "agile", "1.0", "board"]);
        url.query_pairs_mut()
            .append_pair("projectKeyOrId", project_key)
            .append_pair("name", &self.board);
        let page: ValuesPage<Board> = self.http.get_json(&url)?;

        match <[Board; 1]>::try_from(page.values) {
            Ok([board]) => {
                self.steps.log(format_args!("Board {} found", board.name));
                Ok(board)
            }
            Err(values) => Err(JiraError::BoardNotUnique {
                board: self.board.clone(),
                project_key: project_key.to_owned(),
                found: values.len(),
            }),
        }
    }

    fn sprints(&self, board: &Board) -> Result<Vec<Sprint>, JiraError> {
        let board_id = board.id.to_string();
        let mut sprints = Vec::new();
        loop {
            let mut url =
                self.http
                    .endpoint(["rest", "agile", "1.0", "board", board_id.as_str(), "sprint"]);
            url.query_pairs_mut()
                .append_pair("startAt", &sprints.len().to_string());
            let page: ValuesPage<Sprint> = self.http.get_json(&url)?;

            let fetched = page.values.len();
            sprints.extend(page.values);
            if page.is_last || fetched == 0 {
                break;
            }
        }
        debug!("board {} has {} sprints", board.name, sprints.len());
        Ok(sprints)
    }
}

impl IssueTracker for JiraClient {
    fn resolve_context(&self) -> Result<TrackerContext, JiraError> {
        let project = self.project()?;
        let board = self.board(&project.key)?;
        let sprints = self.sprints(&board)?;
        let sprint = select_active_sprint(&sprints, Utc::now())
            .cloned()
            .ok_or_else(|| JiraError::NoActiveSprint {
                board: board.name.clone(),
            })?;
        debug!("active sprint: {} (id {})", sprint.name, sprint.id);

        Ok(TrackerContext {
            project_key: project.key,
            component: self.component.clone(),
            board,
            sprint,
        })
    }

    fn fetch_open_issues(&self) -> Result<Vec<TrackerIssue>, JiraError> {
        let jql = open_issues_jql(&self.username);
        let mut issues = Vec::new();
        loop {
            let mut url = self.http.endpoint(["rest", "api", "2", "search"]);
            url.query_pairs_mut()
                .append_pair("jql", &jql)
                .append_pair("fields", "summary,description")
                .append_pair("startAt", &issues.len().to_string())
                .append_pair("maxResults", &SEARCH_PAGE_SIZE.to_string());
            let page: SearchPage = self.http.get_json(&url).map_err(JiraError::Search)?;

            let fetched = page.issues.len();
            issues.extend(page.issues);
            if fetched == 0 || issues.len() >= page.total {
                break;
            }
        }
        debug!("found {} open issues", issues.len());
        Ok(issues)
    }

    fn create_issue(&self, draft: &IssueDraft) -> Result<TrackerIssue, JiraError> {
        let url = self.http.endpoint(["rest", "api", "2", "issue"]);
        let created: CreatedIssue = self
            .http
            .post_json(&url, &CreateIssueRequest::new(draft))
            .map_err(|err| JiraError::Create {
                summary: draft.summary.clone(),
                err,
            })?;
        self.steps
            .log(format_args!("Created issue {}", created.key));

        Ok(TrackerIssue {
            id: created.id,
            key: created.key,
            fields: Some(IssueFields {
                summary: Some(draft.summary.clone()),
                description: Some(draft.description.clone()),
            }),
        })
    }

    fn add_comment(&self, issue: &TrackerIssue, body: &str) -> Result<(), JiraError> {
        let url = self
            .http
            .endpoint(["rest", "api", "2", "issue", issue.id.as_str(), "comment"]);
        self.http
            .post_json_discard(&url, &CommentRequest { body })
            .map_err(|err| JiraError::Comment {
                issue: issue.key.clone(),
                err,
            })?;
        self.steps.log(format_args!("Updated issue {} with comment", issue.key));
        Ok(())
    }

    fn move_to_sprint(&self, sprint: &Sprint, issue: &TrackerIssue) -> Result<(), JiraError> {
        let sprint_id = sprint.id.to_string();
        let url = self
            .http
            .endpoint(["rest", "agile", "1.0", "sprint", sprint_id.as_str(), "issue"]);
        let request = MoveIssuesRequest {
            issues: [issue.id.as_str()],
        };
        self.http
            .post_json_discard(&url, &request)
            .map_err(|err| JiraError::MoveToSprint {
                issue: issue.key.clone(),
                sprint: sprint.name.clone(),
                err,
            })?;
        self.steps
            .log(format_args!("Moved issue {} to sprint {}", issue.key, sprint.name));
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValuesPage<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    #[serde(default)]
    is_last: bool,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<TrackerIssue>,
}

#[derive(Deserialize)]
struct CreatedIssue {
    id: String,
    key: String,
}

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    fields: CreateIssueFields<'a>,
}

#[derive(Serialize)]
struct CreateIssueFields<'a> {
    project: KeyRef<'a>,
    summary: &'a str,
    description: &'a str,
    issuetype: NameRef<'a>,
    priority: NameRef<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<NameRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<NameRef<'a>>,
}

impl<'a> CreateIssueRequest<'a> {
    fn new(draft: &'a IssueDraft) -> Self {
        Self {
            fields: CreateIssueFields {
                project: KeyRef {
                    key: &draft.project_key,
                },
                summary: &draft.summary,
                description: &draft.description,
                issuetype: NameRef { name: ISSUE_TYPE },
                priority: NameRef {
                    name: ISSUE_PRIORITY,
                },
                components: draft
                    .component
                    .iter()
                    .map(|name| NameRef {
                        name: name.as_str(),
                    })
                    .collect(),
                assignee: draft.assignee.as_deref().map(|name| NameRef { name }),
            },
        }
    }
}

#[derive(Serialize)]
struct KeyRef<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct NameRef<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct MoveIssuesRequest<'a> {
    issues: [&'a str; 1],
}
