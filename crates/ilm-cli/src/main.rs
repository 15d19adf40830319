use ilm_core::ExecutionStateStore;
use ilm_persistence::FileStateStore;

fn main() {
    // Cargar .env si existe para obtener ILM_STATE_DIR
    ilm_persistence::init_dotenv();
    // CLI mínima: `ilm retry --index <NAME> [--state-dir <DIR>]`
    //             `ilm status --index <NAME> [--state-dir <DIR>]`
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("uso: ilm <retry|status> --index <NAME> [--state-dir <DIR>]");
        std::process::exit(2);
    }
    let command = args[1].as_str();
    let mut index: Option<String> = None;
    let mut state_dir: Option<String> = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--index" => {
                i += 1;
                if i < args.len() { index = Some(args[i].clone()); }
            }
            "--state-dir" => {
                i += 1;
                if i < args.len() { state_dir = Some(args[i].clone()); }
            }
            _ => {}
        }
        i += 1;
    }

    let Some(index) = index else {
        eprintln!("[ilm {command}] falta --index <NAME>");
        std::process::exit(2);
    };

    let store = match state_dir {
        Some(dir) => FileStateStore::open(dir),
        None => FileStateStore::from_env(),
    };
    let mut store = match store {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[ilm {command}] state store error: {e}");
            std::process::exit(5);
        }
    };

    match command {
        "status" => {
            let Some(state) = store.load(&index) else {
                eprintln!("[ilm status] índice sin estado registrado: {index}");
                std::process::exit(4);
            };
            match serde_json::to_string_pretty(&state) {
                Ok(doc) => println!("{doc}"),
                Err(e) => {
                    eprintln!("[ilm status] serialize error: {e}");
                    std::process::exit(5);
                }
            }
        }
        "retry" => {
            // Reintento manual: limpia la bandera de error dejando el puntero
            // en el paso fallido; el ejecutor lo re-atacará en el próximo tick
            let Some(mut state) = store.load(&index) else {
                eprintln!("[ilm retry] índice sin estado registrado: {index}");
                std::process::exit(4);
            };
            if !state.is_in_error {
                eprintln!("[ilm retry] el índice {index} no está en estado de error");
                std::process::exit(3);
            }
            state.clear_error();
            if let Err(e) = store.save(&index, &state) {
                eprintln!("[ilm retry] no se pudo persistir el estado: {e}");
                std::process::exit(5);
            }
            println!("[ilm retry] {index} retomará en el paso {}", state.current_step);
        }
        other => {
            eprintln!("[ilm] comando desconocido: {other}");
            std::process::exit(2);
        }
    }
}
