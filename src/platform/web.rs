//! Browser collaborators
//!
//! `RemoteLeaderboard` talks to the hosted score table over its REST
//! interface. Every request runs as a spawned future and parks its reply in
//! a shared inbox that the frame loop drains.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::leaderboard::{
    LeaderboardEntry, LeaderboardPort, LeaderboardRequest, Outcome, Reply, ScoreSubmission,
    StoreError, Ticket, qualifies,
};
use crate::settings::{LeaderboardSettings, ServerConfig};

/// Host endpoint serving leaderboard config
pub const CONFIG_PATH: &str = "/api/config";

const TABLE: &str = "leaderboard";

#[derive(Debug, Clone)]
struct Credentials {
    url: String,
    key: String,
}

/// Hosted leaderboard over `fetch`
pub struct RemoteLeaderboard {
    creds: Option<Credentials>,
    inbox: Rc<RefCell<Vec<Reply>>>,
}

impl RemoteLeaderboard {
    /// Disabled when the settings carry no store credentials
    pub fn new(settings: &LeaderboardSettings) -> Self {
        let creds = match (&settings.store_url, &settings.store_key) {
            (Some(url), Some(key)) if settings.has_store() => Some(Credentials {
                url: url.trim_end_matches('/').to_string(),
                key: key.clone(),
            }),
            _ => {
                log::warn!("Leaderboard credentials missing; leaderboard disabled");
                None
            }
        };
        Self {
            creds,
            inbox: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl LeaderboardPort for RemoteLeaderboard {
    fn dispatch(&mut self, ticket: Ticket, request: LeaderboardRequest) {
        let inbox = Rc::clone(&self.inbox);
        let Some(creds) = self.creds.clone() else {
            inbox.borrow_mut().push(Reply {
                ticket,
                outcome: Outcome::Unavailable,
            });
            return;
        };

        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match request {
                LeaderboardRequest::TopScores { limit } => {
                    Outcome::TopScores(fetch_top(&creds, limit).await.unwrap_or_else(|e| {
                        log::error!("Error fetching leaderboard: {e}");
                        Vec::new()
                    }))
                }
                LeaderboardRequest::CheckQualification { score, limit } => {
                    Outcome::Qualification(match fetch_top(&creds, limit).await {
                        Ok(top) => qualifies(&top, score, limit),
                        Err(e) => {
                            log::error!("Error checking leaderboard qualification: {e}");
                            false
                        }
                    })
                }
                LeaderboardRequest::Submit(submission) => {
                    Outcome::Submitted(match insert(&creds, &submission).await {
                        Ok(()) => {
                            log::info!("Score {} submitted for {}", submission.score, submission.name);
                            true
                        }
                        Err(e) => {
                            log::error!("Error submitting score: {e}");
                            false
                        }
                    })
                }
            };
            inbox.borrow_mut().push(Reply { ticket, outcome });
        });
    }

    fn drain(&mut self) -> Vec<Reply> {
        std::mem::take(&mut *self.inbox.borrow_mut())
    }

    fn is_available(&self) -> bool {
        self.creds.is_some()
    }
}

fn transport(e: JsValue) -> StoreError {
    StoreError::Transport(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Issue a request and return the response body on a 2xx status
async fn send(request: Request) -> Result<String, StoreError> {
    let window = web_sys::window().ok_or(StoreError::Unavailable)?;
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?;
    let response: Response = value.dyn_into().map_err(transport)?;
    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?
        .as_string()
        .unwrap_or_default();
    if !response.ok() {
        return Err(StoreError::Rejected {
            status: response.status(),
            body: text,
        });
    }
    Ok(text)
}

fn store_request(creds: &Credentials, url: &str, init: &RequestInit) -> Result<Request, StoreError> {
    let request = Request::new_with_str_and_init(url, init).map_err(transport)?;
    let headers = request.headers();
    headers.set("apikey", &creds.key).map_err(transport)?;
    headers
        .set("Authorization", &format!("Bearer {}", creds.key))
        .map_err(transport)?;
    headers.set("Content-Type", "application/json").map_err(transport)?;
    Ok(request)
}

async fn fetch_top(creds: &Credentials, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
    let url = format!(
        "{}/rest/v1/{TABLE}?select=player_name,score&order=score.desc&limit={limit}",
        creds.url
    );
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_mode(RequestMode::Cors);
    let body = send(store_request(creds, &url, &init)?).await?;
    let mut rows: Vec<LeaderboardEntry> =
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
    rows.truncate(limit);
    Ok(rows)
}

async fn insert(creds: &Credentials, submission: &ScoreSubmission) -> Result<(), StoreError> {
    let url = format!("{}/rest/v1/{TABLE}", creds.url);
    let json =
        serde_json::to_string(&[submission]).map_err(|e| StoreError::Decode(e.to_string()))?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(&json));
    let request = store_request(creds, &url, &init)?;
    request
        .headers()
        .set("Prefer", "return=minimal")
        .map_err(transport)?;
    send(request).await?;
    Ok(())
}

/// Fetch the host's leaderboard config; `None` when unreachable or malformed
pub async fn fetch_server_config() -> Option<ServerConfig> {
    let request = Request::new_with_str(CONFIG_PATH).ok()?;
    match send(request).await {
        Ok(body) => match ServerConfig::from_json(&body) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Malformed leaderboard config: {e}");
                None
            }
        },
        Err(e) => {
            log::warn!("Could not load leaderboard config: {e}");
            None
        }
    }
}

/// Page URL without query or fragment, used to build challenge links
pub fn page_base_url() -> Option<String> {
    let location = web_sys::window()?.location();
    let origin = location.origin().ok()?;
    let path = location.pathname().ok()?;
    Some(format!("{origin}{path}"))
}

/// Raw query string of the current page (including the leading `?`)
pub fn page_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

fn encode(s: &str) -> String {
    String::from(js_sys::encode_uri_component(s))
}

/// Tweet intent for a finished run
pub fn twitter_share_url(page: &str, score: u64) -> String {
    let text = format!("I scored {score} points in Meltdown! Can you beat my score?");
    format!(
        "https://twitter.com/intent/tweet?text={}&url={}&hashtags={}",
        encode(&text),
        encode(page),
        encode("Meltdown")
    )
}

pub fn facebook_share_url(page: &str) -> String {
    format!("https://www.facebook.com/sharer/sharer.php?u={}", encode(page))
}
