use student_store::{sdk, StudentFields, StudentReader, StudentWriter};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, env = "STUDENT_STORE_DATA_FILE", default_value = "students.json")]
    data_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    List,
    Get { id: String },
    Add {
        id: String,
        name: String,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        marks: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        marks: Option<String>,
    },
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let store = sdk::new(&cli.data_file).await?;

    match cli.command {
        Commands::List => {
            let list = store.list().await?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::Get { id } => {
            let student = store.get(&id).await?;
            println!("{}", serde_json::to_string_pretty(&student)?);
        }
        Commands::Add { id, name, age, course, marks } => {
            let fields = StudentFields { id: Some(id), name: Some(name), age, course, marks };
            let student = store.create(fields).await?;
            println!("{}", serde_json::to_string_pretty(&student)?);
        }
        Commands::Update { id, name, age, course, marks } => {
            let fields = StudentFields { id: None, name, age, course, marks };
            let student = store.update(&id, fields).await?;
            println!("{}", serde_json::to_string_pretty(&student)?);
        }
        Commands::Delete { id } => {
            let removed = store.delete(&id).await?;
            println!("{}", serde_json::to_string_pretty(&removed)?);
        }
    }

    Ok(())
}
