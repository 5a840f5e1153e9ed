use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rustyline::DefaultEditor;

use daat_search::config::{BuildConfig, QueryConfig};
use daat_search::corpus::docstore::DocStore;
use daat_search::index::builder::build_index;
use daat_search::lexicon::table::LexiconTable;
use daat_search::query::evaluator::{QueryEvaluator, QueryMode};
use daat_search::tokenizer::Tokenizer;

#[derive(Parser)]
#[command(name = "daat_search", about = "Block-structured BM25 search engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Builds a compressed inverted index from a TSV document collection.
    Index {
        /// Path to the `docId \t body` TSV corpus file.
        corpus: PathBuf,
        /// Directory to write the index into.
        #[arg(long, default_value = "index")]
        output: PathBuf,
        #[arg(long, default_value_t = daat_search::config::DEFAULT_N)]
        num_docs: u32,
        #[arg(long, default_value_t = daat_search::config::CHUNK_SIZE)]
        chunk_size: usize,
        #[arg(long, default_value_t = daat_search::config::MAX_BLOCKS_PER_FILE)]
        max_blocks_per_file: u32,
    },
    /// Answers BM25 keyword queries against a previously built index.
    Query {
        /// Directory the index was built into.
        index: PathBuf,
        /// A single query to run non-interactively; omit for a REPL.
        #[arg(long)]
        query: Option<String>,
        #[arg(long, value_enum, default_value_t = ModeArg::And)]
        mode: ModeArg,
        #[arg(long, default_value_t = daat_search::config::TOP_K)]
        top_k: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    And,
    Or,
}

impl From<ModeArg> for QueryMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::And => QueryMode::And,
            ModeArg::Or => QueryMode::Or,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Index {
            corpus,
            output,
            num_docs,
            chunk_size,
            max_blocks_per_file,
        } => {
            let config = BuildConfig {
                num_docs_hint: num_docs,
                chunk_size,
                max_blocks_per_file,
            };
            info!("building index from {}", corpus.display());
            build_index(&corpus, &output, &config)?;
            info!("index written to {}", output.display());
        }
        Command::Query {
            index,
            query,
            mode,
            top_k,
        } => {
            run_query(&index, query, mode.into(), top_k)?;
        }
    }
    Ok(())
}

fn run_query(index_dir: &Path, query: Option<String>, mode: QueryMode, top_k: usize) -> anyhow::Result<()> {
    let lexicon = LexiconTable::load(&index_dir.join("lexicon.txt"))?;
    let docstore = DocStore::open(&index_dir.join("docstore.bin"), &index_dir.join("docstore.idx")).ok();
    let tokenizer = Tokenizer::new();
    let config = QueryConfig {
        top_k,
        ..QueryConfig::default()
    };

    if let Some(q) = query {
        answer_query(index_dir, &lexicon, &tokenizer, docstore.as_ref(), &q, mode, &config)?;
        return Ok(());
    }

    // Spec §6.7: menu-driven REPL — pick a mode each round, then a query, until `3` exits.
    let mut rl = DefaultEditor::new()?;
    while let Ok(choice) = rl.readline("1) AND  2) OR  3) exit > ") {
        let choice = choice.trim();
        let mode = match choice {
            "1" => QueryMode::And,
            "2" => QueryMode::Or,
            "3" => break,
            "" => continue,
            _ => {
                println!("invalid selection, enter 1, 2, or 3");
                continue;
            }
        };
        let line = match rl.readline("query> ") {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            println!("empty query, returning to menu");
            continue;
        }
        let _ = rl.add_history_entry(line);
        if let Err(e) = answer_query(index_dir, &lexicon, &tokenizer, docstore.as_ref(), line, mode, &config) {
            eprintln!("error: {e}");
        }
    }
    Ok(())
}

fn answer_query(
    index_dir: &std::path::Path,
    lexicon: &LexiconTable,
    tokenizer: &Tokenizer,
    docstore: Option<&DocStore>,
    query: &str,
    mode: QueryMode,
    config: &QueryConfig,
) -> anyhow::Result<()> {
    let terms = tokenizer.tokenize(query);
    if terms.is_empty() {
        println!("(no query terms)");
        return Ok(());
    }
    let evaluator = QueryEvaluator::new(index_dir, lexicon, config.top_k);
    let results = evaluator.evaluate(&terms, mode)?;
    if results.is_empty() {
        println!("no results");
    }
    for (rank, (doc_id, score)) in results.iter().enumerate() {
        let snippet = docstore
            .and_then(|s| s.lookup(*doc_id))
            .map(|b| b.chars().take(80).collect::<String>())
            .unwrap_or_default();
        println!("{:>2}. doc {:>8}  score {:.4}  {}", rank + 1, doc_id, score, snippet);
    }
    Ok(())
}
