mod note;

pub use note::NoteView;
