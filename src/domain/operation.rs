use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Divide,
    Multiply,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Divide,
        Operation::Multiply,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Divide => "divide",
            Self::Multiply => "multiply",
        }
    }

    pub fn http_path(self) -> &'static str {
        match self {
            Self::Add => "/add",
            Self::Subtract => "/sub",
            Self::Divide => "/div",
            Self::Multiply => "/mul",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Operation;

    #[test]
    fn http_paths_are_distinct() {
        let mut paths: Vec<_> = Operation::ALL.iter().map(|op| op.http_path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths, vec!["/add", "/div", "/mul", "/sub"]);
    }
}
