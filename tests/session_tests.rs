// Tests for the message-driven session host

mod common;

use common::{halt, input, ortho, out};
use umtty::loader::bytes_from_words;
use umtty::machine::MachineError;
use umtty::session::{Event, Request, Session, SessionError, Sessions, Status};

fn prompt_program() -> Vec<u8> {
    bytes_from_words(&[ortho(1, b'>' as u32), out(1), input(0), out(0), halt()])
}

#[test]
fn test_load_prompt_and_resume() {
    let mut session = Session::new();
    assert_eq!(session.status(), Status::Idle);
    assert_eq!(session.pump(None), Status::Idle);

    session
        .handle(Request::LoadProgram(prompt_program()))
        .expect("Load failed");
    assert_eq!(session.status(), Status::Running);

    assert_eq!(session.pump(None), Status::AwaitingInput);
    assert_eq!(
        session.drain_events(),
        vec![
            Event::ProgramLoaded { platters: 5 },
            Event::Print(b">".to_vec()),
            Event::ReadLine,
        ]
    );

    // Pumping while still waiting does not ask again
    assert_eq!(session.pump(None), Status::AwaitingInput);
    assert!(session.drain_events().is_empty());

    session
        .handle(Request::ReadLineDone(b"q\n".to_vec()))
        .expect("Input failed");
    assert_eq!(session.pump(None), Status::Halted);
    assert_eq!(
        session.drain_events(),
        vec![Event::Print(b"q".to_vec()), Event::Halted]
    );

    assert_eq!(session.pump(None), Status::Halted);
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_output_is_coalesced() {
    let program = bytes_from_words(&[ortho(0, b'o' as u32), ortho(1, b'k' as u32), out(0), out(1), halt()]);
    let mut session = Session::new();
    session.handle(Request::LoadProgram(program)).unwrap();
    session.drain_events();

    assert_eq!(session.pump(None), Status::Halted);
    assert_eq!(
        session.drain_events(),
        vec![Event::Print(b"ok".to_vec()), Event::Halted]
    );
}

#[test]
fn test_end_of_input_request() {
    let mut session = Session::new();
    session.handle(Request::LoadProgram(prompt_program())).unwrap();
    session.pump(None);
    session.drain_events();

    session.handle(Request::EndOfInput).unwrap();
    assert_eq!(session.pump(None), Status::Halted);
    assert_eq!(
        session.drain_events(),
        vec![Event::Print(vec![0xFF]), Event::Halted]
    );
}

#[test]
fn test_budget_keeps_running() {
    let mut session = Session::new();
    session.handle(Request::LoadProgram(prompt_program())).unwrap();

    assert_eq!(session.pump(Some(1)), Status::Running);
    assert_eq!(session.machine().map(|m| m.pc()), Some(1));
    assert_eq!(session.pump(Some(100)), Status::AwaitingInput);
}

#[test]
fn test_fault_event() {
    let mut session = Session::new();
    session
        .handle(Request::LoadProgram(bytes_from_words(&[0xE000_0000])))
        .unwrap();
    session.drain_events();

    assert_eq!(session.pump(None), Status::Faulted);
    let events = session.drain_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Fault { error, snapshot } => {
            assert_eq!(
                error,
                &MachineError::InvalidOpcode {
                    opcode: 14,
                    word: 0xE000_0000
                }
            );
            assert_eq!(snapshot.pc, 1);
            assert_eq!(snapshot.last_word, Some(0xE000_0000));
        }
        other => panic!("Expected fault, got {:?}", other),
    }

    assert_eq!(session.pump(None), Status::Faulted);
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_reload_replaces_machine() {
    let mut session = Session::new();
    session
        .handle(Request::LoadProgram(bytes_from_words(&[0xE000_0000])))
        .unwrap();
    session.pump(None);

    session.handle(Request::LoadProgram(prompt_program())).unwrap();
    assert_eq!(session.status(), Status::Running);
    assert_eq!(session.pump(None), Status::AwaitingInput);
}

#[test]
fn test_request_errors() {
    let mut session = Session::new();
    assert!(matches!(
        session.handle(Request::ReadLineDone(b"x\n".to_vec())),
        Err(SessionError::NoProgram)
    ));
    assert!(matches!(
        session.handle(Request::LoadProgram(vec![1, 2, 3])),
        Err(SessionError::Load(_))
    ));
    assert_eq!(session.status(), Status::Idle);
}

#[test]
fn test_sessions_are_independent() {
    let mut sessions = Sessions::new();
    let a = sessions.open();
    let b = sessions.open();
    assert_ne!(a, b);
    assert_eq!(sessions.len(), 2);

    sessions.handle(a, Request::LoadProgram(prompt_program())).unwrap();
    sessions
        .handle(b, Request::LoadProgram(bytes_from_words(&[halt()])))
        .unwrap();

    assert_eq!(
        sessions.pump_all(None),
        vec![(a, Status::AwaitingInput), (b, Status::Halted)]
    );

    sessions.handle(a, Request::ReadLineDone(b"z\n".to_vec())).unwrap();
    assert_eq!(
        sessions.get_mut(a).map(|s| s.pump(None)),
        Some(Status::Halted)
    );
    assert_eq!(
        sessions.get(b).and_then(|s| s.machine()).map(|m| m.cycle()),
        Some(1)
    );

    assert!(sessions.close(a).is_some());
    assert!(matches!(
        sessions.handle(a, Request::EndOfInput),
        Err(SessionError::UnknownSession(id)) if id == a
    ));
    assert!(!sessions.is_empty());
}
