///! Some utility functions

use crate::item::MergedViewEntry;
use crate::provider::SourceReport;
use crate::view::MergedView;

/// A debug utility that pretty-prints a view
pub fn print_view(view: &MergedView) {
    println!("VIEW {} .. {}", view.window().past(), view.window().future());
    for entry in view.entries() {
        print_entry(entry);
    }
}

pub fn print_entry(entry: &MergedViewEntry) {
    let kind = match entry {
        MergedViewEntry::Editable(task) => if task.completed() { "✓" } else { " " },
        MergedViewEntry::Imported(_) => "⧉",
    };
    println!("    {} {} → {}  {}\t{}", kind, entry.start(), entry.end(), entry.name(), entry.id());
}

/// A debug utility that pretty-prints what has been imported from each source
pub fn print_reports(reports: &[SourceReport]) {
    for report in reports {
        match &report.error {
            Some(err) => println!("SOURCE {} (failed: {})", report.source, err),
            None => println!("SOURCE {} ({} occurrences)", report.source, report.occurrences.len()),
        }
        for occurrence in &report.occurrences {
            println!("    {} → {}  {}", occurrence.start(), occurrence.end(), occurrence.summary());
        }
    }
}
