pub mod token_file;
