/// Status filter for the derived task view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Completed => "Completed",
            Self::Pending => "Pending",
        }
    }

    /// Whether a task with this completion flag passes the filter
    pub fn matches(&self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Completed => completed,
            Self::Pending => !completed,
        }
    }

    /// Next filter in the selector cycle
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Completed,
            Self::Completed => Self::Pending,
            Self::Pending => Self::All,
        }
    }
}

/// Ordering applied to the full task list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriteria {
    Title,
    DueDate,
    CreatedAt,
}

impl SortCriteria {
    /// Key used in logs ("title", "dueDate", "createdAt")
    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DueDate => "dueDate",
            Self::CreatedAt => "createdAt",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Sort by Title",
            Self::DueDate => "Sort by Due Date",
            Self::CreatedAt => "Sort by Created",
        }
    }

    /// Next criteria in the selector cycle (None starts at Title)
    pub fn cycle(current: Option<Self>) -> Self {
        match current {
            None | Some(Self::CreatedAt) => Self::Title,
            Some(Self::Title) => Self::DueDate,
            Some(Self::DueDate) => Self::CreatedAt,
        }
    }
}

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Login,
    Normal,
    Searching,
    AddingTask,
    EditingTask,
    Notice, // Blocking message, any key dismisses
}

/// Field focus in the task form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    DueDate,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::DueDate,
            Self::DueDate => Self::Title,
        }
    }
}

/// Field focus on the login screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

impl LoginField {
    pub fn next(&self) -> Self {
        match self {
            Self::Username => Self::Password,
            Self::Password => Self::Username,
        }
    }
}
