use criterion::{Criterion, criterion_group, criterion_main};
use restricted_editing_engine::capabilities::CommandRegistry;
use restricted_editing_engine::restricted_editing::{EXCEPTION_GROUP, GateState, apply_gate};
use restricted_editing_engine::{Editor, RestrictedEditing, RestrictedEditingConfig};
mod common;

fn bench_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate");
    group.sample_size(10);

    let mut editor = Editor::new();
    RestrictedEditing::new(RestrictedEditingConfig::default()).init(&mut editor);
    editor.set_data(&common::generate_form_markup(1000)).unwrap();
    let len = editor.document().len();

    group.bench_function("state_for_focus", |b| {
        let markers = editor.document().markers();
        b.iter(|| {
            let state = GateState::for_focus(std::hint::black_box(len / 2), markers, EXCEPTION_GROUP);
            std::hint::black_box(state);
        });
    });

    group.bench_function("apply_gate", |b| {
        let mut commands = CommandRegistry::new();
        for i in 0..50 {
            commands.register(&format!("command-{i}"));
        }
        let always_enabled = vec!["undo".to_string(), "redo".to_string()];
        let mut state = GateState::Restricted;
        b.iter(|| {
            state = match state {
                GateState::Restricted => GateState::Unrestricted,
                GateState::Unrestricted => GateState::Restricted,
            };
            apply_gate(state, &mut commands, &always_enabled);
        });
    });

    group.bench_function("selection_change", |b| {
        let mut focus = 0;
        b.iter(|| {
            focus = (focus + 37) % len;
            editor.set_selection(focus, focus).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_gate);
criterion_main!(benches);
