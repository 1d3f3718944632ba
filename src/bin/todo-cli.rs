use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};

use todo_api::auth::capability;

#[derive(Parser)]
#[command(name = "todo-cli")]
#[command(about = "Command-line client for the todo API", long_about = None)]
struct Cli {
    /// API base URL including the route prefix.
    #[arg(short, long, default_value = "http://localhost:3000/api-todo")]
    url: String,

    /// Caller id sent as x-user-id.
    #[arg(long, env = "TODO_CLI_USER")]
    user: String,

    /// Caller role sent as x-user-role.
    #[arg(long)]
    role: Option<String>,

    /// Comma-separated privileges sent as x-user-privilege. Defaults to all.
    #[arg(long)]
    privileges: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List todo lists you own or can access
    Lists,
    /// Create a todo list
    CreateList { title: String },
    /// Show a todo list with its todos
    ShowList { id: String },
    /// Delete a todo list and everything in it
    DeleteList { id: String },
    /// Add a todo to a list
    AddTodo {
        list_id: String,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show a todo with its comments
    ShowTodo { id: String },
    /// Mark a todo as completed (or not, with --undo)
    CompleteTodo {
        id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a todo
    DeleteTodo { id: String },
    /// Comment on a todo
    Comment { todo_id: String, text: String },
    /// Delete a comment
    DeleteComment { id: String },
    /// List users a todo list is shared with
    Grants { list_id: String },
    /// Share a todo list with another user
    Share { list_id: String, user_id: String },
    /// Stop sharing a todo list with a user
    Unshare { list_id: String, user_id: String },
}

impl Commands {
    fn request(&self) -> (Method, String, Option<Value>) {
        match self {
            Commands::Lists => (Method::GET, "/todolists".into(), None),
            Commands::CreateList { title } => {
                (Method::POST, "/todolists".into(), Some(json!({ "title": title })))
            }
            Commands::ShowList { id } => (Method::GET, format!("/todolists/{id}"), None),
            Commands::DeleteList { id } => (Method::DELETE, format!("/todolists/{id}"), None),
            Commands::AddTodo { list_id, title, description } => {
                let mut body = json!({ "title": title });
                if let Some(description) = description {
                    body["description"] = json!(description);
                }
                (Method::POST, format!("/todolists/{list_id}/todos"), Some(body))
            }
            Commands::ShowTodo { id } => (Method::GET, format!("/todos/{id}"), None),
            Commands::CompleteTodo { id, undo } => (
                Method::PATCH,
                format!("/todos/{id}"),
                Some(json!({ "completed": !undo })),
            ),
            Commands::DeleteTodo { id } => (Method::DELETE, format!("/todos/{id}"), None),
            Commands::Comment { todo_id, text } => (
                Method::POST,
                format!("/todos/{todo_id}/comments"),
                Some(json!({ "text": text })),
            ),
            Commands::DeleteComment { id } => (Method::DELETE, format!("/comments/{id}"), None),
            Commands::Grants { list_id } => (Method::GET, format!("/todolists/{list_id}/access"), None),
            Commands::Share { list_id, user_id } => (
                Method::POST,
                format!("/todolists/{list_id}/access"),
                Some(json!({ "userId": user_id })),
            ),
            Commands::Unshare { list_id, user_id } => (
                Method::DELETE,
                format!("/todolists/{list_id}/access/{user_id}"),
                None,
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let privileges = cli
        .privileges
        .clone()
        .unwrap_or_else(|| capability::ALL.join(","));

    let mut headers = HeaderMap::new();
    headers.insert("x-user-id", HeaderValue::from_str(&cli.user)?);
    headers.insert("x-user-privilege", HeaderValue::from_str(&privileges)?);
    if let Some(role) = &cli.role {
        headers.insert("x-user-role", HeaderValue::from_str(role)?);
    }

    let (method, path, body) = cli.command.request();
    let mut req = client
        .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers);
    if let Some(body) = body {
        req = req.json(&body);
    }

    print_response(req.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("{}", status);
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
