pub mod dispatcher;
pub mod schedule;
pub mod source_list;
pub mod supervisor;
