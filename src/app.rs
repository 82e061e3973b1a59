use todostore::{NewTodo, RepoError, Todo, TodoId, TodoPatch, TodoRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Title,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DraftTarget {
    New,
    Existing(TodoId),
}

pub struct App<R: TodoRepository> {
    repo: R,
    pub todos: Vec<Todo>,
    pub selected: usize,
    pub mode: InputMode,
    pub input: String,
    draft_title: String,
    target: DraftTarget,
    pub status: Option<String>,
}

impl<R: TodoRepository> App<R> {
    pub fn new(repo: R) -> Self {
        let todos = repo.list_all();
        Self {
            repo,
            todos,
            selected: 0,
            mode: InputMode::Normal,
            input: String::new(),
            draft_title: String::new(),
            target: DraftTarget::New,
            status: None,
        }
    }

    pub fn reload(&mut self) {
        self.todos = self.repo.list_all();
        if self.selected >= self.todos.len() {
            self.selected = self.todos.len().saturating_sub(1);
        }
    }

    pub fn select_next(&mut self) {
        if !self.todos.is_empty() {
            self.selected = (self.selected + 1).min(self.todos.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.todos.get(self.selected)
    }

    pub fn is_editing_existing(&self) -> bool {
        matches!(self.target, DraftTarget::Existing(_))
    }

    pub fn toggle_selected(&mut self) {
        let Some(todo) = self.selected_todo() else {
            return;
        };
        let id = todo.id.clone();
        let done = !todo.done_status;
        match self.repo.update(&id, TodoPatch::done(done)) {
            Ok(_) => {
                self.reload();
                self.set_status(if done { "Marked done" } else { "Marked open" });
            }
            Err(err) => self.report(err),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(todo) = self.selected_todo() else {
            return;
        };
        let id = todo.id.clone();
        match self.repo.delete(&id) {
            Ok(removed) => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
                self.reload();
                self.set_status(&format!("Deleted \"{}\"", removed.title));
            }
            Err(err) => self.report(err),
        }
    }

    pub fn start_add(&mut self) {
        self.target = DraftTarget::New;
        self.draft_title.clear();
        self.input.clear();
        self.mode = InputMode::Title;
        self.set_status("Type a title and press Enter");
    }

    pub fn start_edit(&mut self) {
        let Some(todo) = self.selected_todo() else {
            return;
        };
        let (id, title) = (todo.id.clone(), todo.title.clone());
        self.target = DraftTarget::Existing(id);
        self.input = title;
        self.draft_title.clear();
        self.mode = InputMode::Title;
        self.set_status("Edit the title and press Enter");
    }

    pub fn cancel_input(&mut self) {
        self.mode = InputMode::Normal;
        self.input.clear();
        self.draft_title.clear();
        self.set_status("Canceled");
    }

    pub fn submit_input(&mut self) {
        match self.mode {
            InputMode::Normal => {}
            InputMode::Title => {
                if self.input.trim().is_empty() {
                    self.set_status("Title must not be empty");
                    return;
                }
                self.draft_title = self.input.trim().to_owned();
                self.input = match &self.target {
                    DraftTarget::Existing(id) => self
                        .todos
                        .iter()
                        .find(|t| &t.id == id)
                        .map(|t| t.description.clone())
                        .unwrap_or_default(),
                    DraftTarget::New => String::new(),
                };
                self.mode = InputMode::Description;
                self.set_status("Type a description (may be empty) and press Enter");
            }
            InputMode::Description => self.commit_draft(),
        }
    }

    fn commit_draft(&mut self) {
        let title = std::mem::take(&mut self.draft_title);
        let description = std::mem::take(&mut self.input).trim().to_owned();
        self.mode = InputMode::Normal;

        match self.target.clone() {
            DraftTarget::New => match self.repo.create(NewTodo::new(title, description)) {
                Ok(todo) => {
                    self.reload();
                    if let Some(pos) = self.todos.iter().position(|t| t.id == todo.id) {
                        self.selected = pos;
                    }
                    self.set_status("Added");
                }
                Err(err) => self.report(err),
            },
            DraftTarget::Existing(id) => {
                let patch = TodoPatch {
                    title: Some(title),
                    description: Some(description),
                    done_status: None,
                };
                match self.repo.update(&id, patch) {
                    Ok(_) => {
                        self.reload();
                        self.set_status("Updated");
                    }
                    Err(err) => self.report(err),
                }
            }
        }
    }

    fn report(&mut self, err: RepoError) {
        let msg = match &err {
            RepoError::NotFound(_) => {
                self.reload();
                "That todo no longer exists; list reloaded".to_string()
            }
            RepoError::DuplicateContent { .. } => {
                "A todo with the same title and description already exists".to_string()
            }
            RepoError::Validation(inner) => format!("Invalid todo: {inner}"),
            RepoError::StorageWrite { .. } => format!("NOT saved: {err}"),
        };
        self.set_status(&msg);
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status = Some(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todostore::InMemoryTodoRepo;

    fn app_with(titles: &[(&str, &str)]) -> App<InMemoryTodoRepo> {
        let seed = titles.iter().map(|(t, d)| Todo::new(*t, *d));
        App::new(InMemoryTodoRepo::with_seed(seed))
    }

    fn type_text(app: &mut App<InMemoryTodoRepo>, text: &str) {
        app.input.push_str(text);
        app.submit_input();
    }

    #[test]
    fn add_flow_prompts_for_title_then_description() {
        let mut app = app_with(&[]);
        app.start_add();
        type_text(&mut app, "Write docs");
        assert_eq!(app.mode, InputMode::Description);
        type_text(&mut app, "for the store");

        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.todos[0].description, "for the store");
        assert_eq!(app.status.as_deref(), Some("Added"));
    }

    #[test]
    fn duplicate_add_reports_distinct_message() {
        let mut app = app_with(&[("A", "B")]);
        app.start_add();
        type_text(&mut app, "A");
        type_text(&mut app, "B");

        assert_eq!(app.todos.len(), 1);
        assert!(app.status.as_deref().unwrap().contains("already exists"));
    }

    #[test]
    fn empty_title_stays_in_title_mode() {
        let mut app = app_with(&[]);
        app.start_add();
        type_text(&mut app, "   ");
        assert_eq!(app.mode, InputMode::Title);
        assert!(app.todos.is_empty());
    }

    #[test]
    fn toggle_only_changes_done_status() {
        let mut app = app_with(&[("T", "D")]);
        app.toggle_selected();
        let todo = &app.todos[0];
        assert!(todo.done_status);
        assert_eq!(todo.title, "T");
        assert_eq!(todo.description, "D");
    }

    #[test]
    fn edit_prefills_and_keeps_id() {
        let mut app = app_with(&[("T", "D")]);
        let id = app.todos[0].id.clone();
        app.start_edit();
        assert_eq!(app.input, "T");
        app.input.push('2');
        app.submit_input();
        assert_eq!(app.input, "D");
        app.submit_input();

        assert_eq!(app.todos[0].id, id);
        assert_eq!(app.todos[0].title, "T2");
        assert_eq!(app.todos[0].description, "D");
    }

    #[test]
    fn edit_with_nothing_selected_stays_normal() {
        let mut app = app_with(&[]);
        app.start_edit();
        assert_eq!(app.mode, InputMode::Normal);
        assert!(!app.is_editing_existing());
    }

    #[test]
    fn delete_moves_selection_back() {
        let mut app = app_with(&[("one", ""), ("two", "")]);
        app.select_next();
        app.delete_selected();
        assert_eq!(app.selected, 0);
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.todos[0].title, "one");
    }
}
