pub mod list_directory;
pub mod read_file;
pub mod run_script;
pub mod write_file;

pub use list_directory::ListDirectoryTool;
pub use read_file::ReadFileTool;
pub use run_script::{RunScriptTool, ScriptOutput, NO_OUTPUT};
pub use write_file::WriteFileTool;
