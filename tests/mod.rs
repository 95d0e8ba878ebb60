use std::time::{Duration, UNIX_EPOCH};

use blockdb::{
    database::{Database, DatabaseConfig},
    storage::{AccessStatistics, BlockId, FileManager, FileManagerConfig, Page, PageError},
};
use tempfile::tempdir;

fn file_manager(dir: &std::path::Path, block_size: usize) -> anyhow::Result<FileManager> {
    Ok(FileManager::new(FileManagerConfig::new(dir, block_size))?)
}

#[test]
fn store_load_mixed_data() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let file_name = "storeLoadMixedData.dat";
    let fm = file_manager(dir.path(), 512)?;

    let mut page = Page::new(fm.block_size());

    page.put_char(0, 'A')?;
    page.put_int(5, 111)?;
    page.put_long(10, 777)?;
    page.put_bool(20, true)?;
    page.put_bool(21, false)?;

    page.put_bytes(100, &[10, 20, 30, 40, 50])?;
    page.put_string(120, "Hello, world!!!")?;
    page.put_string_c(150, "c-like string")?;

    let now = UNIX_EPOCH + Duration::from_millis(1_760_000_000_000);
    page.put_timestamp(200, now)?;

    fm.write(&BlockId::new(file_name, 0), &page)?;

    let mut new_page = Page::new(fm.block_size());
    fm.read(&BlockId::new(file_name, 0), &mut new_page)?;

    assert_eq!(new_page.get_char(0)?, 'A');
    assert_eq!(new_page.get_int(5)?, 111);
    assert_eq!(new_page.get_long(10)?, 777);
    assert!(new_page.get_bool(20)?);
    assert!(!new_page.get_bool(21)?);

    assert_eq!(new_page.get_bytes(100)?, vec![10, 20, 30, 40, 50]);
    assert_eq!(new_page.get_string(120)?, "Hello, world!!!");
    assert_eq!(new_page.get_string_c(150)?, "c-like string");

    assert_eq!(new_page.get_timestamp(200)?, now);

    assert_eq!(fm.stats(), AccessStatistics::new(1, 1));

    Ok(())
}

#[test]
fn blocks_survive_reopen() -> anyhow::Result<()> {
    let dir = tempdir()?;

    {
        let fm = file_manager(dir.path(), 64)?;
        for i in 0..3 {
            let block = fm.append("table.dat")?;
            let mut page = Page::new(64);
            page.put_int(0, i * 10)?;
            fm.write(&block, &page)?;
        }
    }

    let fm = file_manager(dir.path(), 64)?;
    assert!(!fm.is_new());
    assert_eq!(fm.length("table.dat")?, 3);

    for i in 0..3 {
        let mut page = Page::new(64);
        fm.read(&BlockId::new("table.dat", i as u32), &mut page)?;
        assert_eq!(page.get_int(0)?, i * 10);
    }

    // on-disk layout is a plain sequence of blocks
    let raw = std::fs::read(dir.path().join("table.dat"))?;
    assert_eq!(raw.len(), 3 * 64);
    assert_eq!(&raw[128..132], &20_i32.to_be_bytes());

    Ok(())
}

#[test]
fn blocks_do_not_overlap() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fm = file_manager(dir.path(), 32)?;

    let first = Page::from_bytes(vec![1; 32]);
    let second = Page::from_bytes(vec![2; 32]);

    fm.write(&BlockId::new("f.dat", 0), &first)?;
    fm.write(&BlockId::new("f.dat", 1), &second)?;
    fm.write(&BlockId::new("g.dat", 0), &second)?;

    let mut page = Page::new(32);

    fm.read(&BlockId::new("f.dat", 0), &mut page)?;
    assert!(page.as_ref().iter().all(|&b| b == 1));

    fm.read(&BlockId::new("f.dat", 1), &mut page)?;
    assert!(page.as_ref().iter().all(|&b| b == 2));

    fm.read(&BlockId::new("g.dat", 0), &mut page)?;
    assert!(page.as_ref().iter().all(|&b| b == 2));

    assert_eq!(fm.stats(), AccessStatistics::new(3, 3));

    Ok(())
}

#[test]
fn boolean_round_trip_through_disk() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fm = file_manager(dir.path(), 512)?;
    let block = BlockId::new("bool.dat", 0);

    let mut page = Page::new(512);
    page.put_bool(20, true)?;
    page.put_bool(21, false)?;
    fm.write(&block, &page)?;

    let mut new_page = Page::new(512);
    fm.read(&block, &mut new_page)?;

    assert!(new_page.get_bool(20)?);
    assert!(!new_page.get_bool(21)?);

    Ok(())
}

#[test]
fn out_of_bounds_is_reported() -> anyhow::Result<()> {
    let mut page = Page::new(16);

    let err = page.put_string(10, "too long").unwrap_err();
    assert!(matches!(
        err,
        PageError::OutOfBounds {
            offset: 10,
            width: 12,
            capacity: 16
        }
    ));
    assert!(page.as_ref().iter().all(|&b| b == 0));

    Ok(())
}

#[test]
fn database_opens_with_config() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config = DatabaseConfig {
        directory: dir.path().join("db"),
        block_size: 128,
    };

    let database = Database::open(config.clone())?;
    let fm = database.file_manager();

    assert_eq!(database.config(), &config);
    assert_eq!(fm.block_size(), 128);
    assert!(fm.is_new());

    let block = fm.append("data.dat")?;
    assert_eq!(block.to_string(), "[file='data.dat', no='0']");

    Ok(())
}
