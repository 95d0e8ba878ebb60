use blockdb::{
    database::config::parse_block_size, error::DatabaseError,
    storage::file_manager::check_file_name,
};

pub fn validate_block_size(input: &str) -> Result<usize, DatabaseError> {
    parse_block_size(input)
}

pub fn validate_file_name(input: &str) -> Result<String, DatabaseError> {
    check_file_name(input)
        .map_err(|_| DatabaseError::InvalidFilePath(format!("'{input}' is not a plain file name")))?;

    Ok(input.to_string())
}
