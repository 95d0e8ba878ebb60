use clap::Parser;
use cli::{AppendArgs, Cli, Commands, DemoArgs, InfoArgs, InspectArgs};

use blockdb::{
    database::{Database, DatabaseConfig},
    storage::{BlockId, FileManager, Page},
    utils::debug_table::DebugTable,
};

mod cli;

const BYTES_PER_ROW: usize = 16;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level)?;

    let mut config = DatabaseConfig::from_env()?;
    if let Some(directory) = cli.directory {
        config.directory = directory;
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }

    let database = Database::open(config)?;
    let file_manager = database.file_manager();

    match cli.command {
        Commands::Demo(DemoArgs { file }) => demo(&file_manager, &file)?,
        Commands::Append(AppendArgs { file, count }) => {
            for _ in 0..count {
                let block = file_manager.append(&file)?;
                println!("{block}");
            }
        }
        Commands::Inspect(InspectArgs { file, block }) => {
            inspect(&file_manager, &BlockId::new(file, block))?
        }
        Commands::Info(InfoArgs { file }) => info(&file_manager, &file)?,
    }

    log::info!("Access statistics: {:?}", file_manager.stats());

    Ok(())
}

fn demo(file_manager: &FileManager, file: &str) -> anyhow::Result<()> {
    let block = BlockId::new(file, 0);

    let mut page = Page::new(file_manager.block_size());
    page.put_string(0, "Hello, world!!!")?;
    page.put_int(50, 123)?;

    file_manager.write(&block, &page)?;

    let mut new_page = Page::new(file_manager.block_size());
    file_manager.read(&block, &mut new_page)?;

    log::info!(
        "Read from {block}, str: '{}', int: {}",
        new_page.get_string(0)?,
        new_page.get_int(50)?
    );

    Ok(())
}

fn inspect(file_manager: &FileManager, block: &BlockId) -> anyhow::Result<()> {
    let mut page = Page::new(file_manager.block_size());
    file_manager.read(block, &mut page)?;

    let mut table = DebugTable::new();
    table.add_column("offset");
    table.add_column("hex");
    table.add_column("ascii");

    let mut zero_rows = 0;

    for (i, row) in page.as_ref().chunks(BYTES_PER_ROW).enumerate() {
        if row.iter().all(|&b| b == 0) {
            zero_rows += 1;
            continue;
        }

        let hex = row
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii = row
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect::<String>();

        table.insert_row(vec![(i * BYTES_PER_ROW).to_string(), hex, ascii]);
    }

    println!("{block}");
    print!("{table}");
    if zero_rows > 0 {
        println!("({zero_rows} all-zero rows of {BYTES_PER_ROW} bytes omitted)");
    }

    Ok(())
}

fn info(file_manager: &FileManager, file: &str) -> anyhow::Result<()> {
    let stats = file_manager.stats();

    let mut table = DebugTable::new();
    table.add_column("property");
    table.add_column("value");

    table.insert_row(vec![
        "directory".into(),
        file_manager.directory().display().to_string(),
    ]);
    table.insert_row(vec![
        "block size".into(),
        file_manager.block_size().to_string(),
    ]);
    table.insert_row(vec![
        format!("blocks in '{file}'"),
        file_manager.length(file)?.to_string(),
    ]);
    table.insert_row(vec!["blocks read".into(), stats.blocks_read.to_string()]);
    table.insert_row(vec![
        "blocks written".into(),
        stats.blocks_written.to_string(),
    ]);

    print!("{table}");

    Ok(())
}
