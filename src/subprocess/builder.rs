use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One launch request: the executable path followed by its arguments, plus
/// optional overrides for the inherited working directory and environment.
#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    /// Render the command for display: program and arguments joined by
    /// single spaces.
    ///
    /// No quoting or escaping is performed, so an argument containing a
    /// space is indistinguishable from two arguments in the rendered
    /// string. Process creation always uses the argument vector itself;
    /// this string is diagnostic only.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: ProcessCommand {
                program: program.to_string(),
                args: Vec::new(),
                env: HashMap::new(),
                working_dir: None,
                timeout: None,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command
            .args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self.command
                .env
                .insert(key.as_ref().to_string(), value.as_ref().to_string());
        }
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.command.working_dir = Some(dir.to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.command.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_all_fields() {
        let command = ProcessCommandBuilder::new("tool")
            .arg("arg1")
            .args(["arg2", "arg3"])
            .env("KEY1", "value1")
            .envs([("KEY2", "value2")])
            .current_dir(Path::new("/tmp"))
            .timeout(Duration::from_secs(30))
            .build();

        assert_eq!(command.program, "tool");
        assert_eq!(command.args, vec!["arg1", "arg2", "arg3"]);
        assert_eq!(command.env.get("KEY1"), Some(&"value1".to_string()));
        assert_eq!(command.env.get("KEY2"), Some(&"value2".to_string()));
        assert_eq!(command.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(command.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn command_line_joins_with_single_spaces() {
        let command = ProcessCommandBuilder::new("/usr/bin/tool")
            .args(["-v", "input.bin"])
            .build();
        assert_eq!(command.command_line(), "/usr/bin/tool -v input.bin");
    }

    #[test]
    fn command_line_without_args_is_just_the_program() {
        let command = ProcessCommandBuilder::new("tool").build();
        assert_eq!(command.command_line(), "tool");
    }

    #[test]
    fn command_line_does_not_quote_embedded_spaces() {
        // Deliberate: the joined form is display-only and reproduces the
        // ambiguity of the arguments as given.
        let command = ProcessCommandBuilder::new("tool")
            .arg("path with spaces/file.bin")
            .build();
        assert_eq!(command.command_line(), "tool path with spaces/file.bin");
    }
}
