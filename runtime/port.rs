use std::fs;
use std::io;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use tracing::debug;

/// Descriptor of an open port
pub type Fd = usize;

pub const STDIN_FD: Fd = 0;
pub const STDOUT_FD: Fd = 1;
pub const STDERR_FD: Fd = 2;

/// How `open` should treat the file
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OpenMode {
    /// `r`: read an existing file
    Read,
    /// `w`: write a file, creating it if needed
    ///
    /// Existing contents aren't truncated; writes overwrite from the start of the file.
    Write,
    /// `+`: read and write a file, creating it if needed
    ReadWrite,
}

impl OpenMode {
    pub fn from_mode_char(c: u8) -> Option<OpenMode> {
        match c {
            b'r' => Some(OpenMode::Read),
            b'w' => Some(OpenMode::Write),
            b'+' => Some(OpenMode::ReadWrite),
            _ => None,
        }
    }
}

enum Port {
    Input(Box<dyn BufRead>),
    Output(Box<dyn Write>),
    /// Unbuffered so reads and writes share one cursor
    File(fs::File),
}

/// Table of open ports indexed by descriptor
///
/// Descriptors 0 to 2 are the standard streams. Closed descriptors are reused by later `open`
/// calls.
pub struct Ports {
    table: Vec<Option<Port>>,
}

fn closed_port() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "port is not open")
}

fn read_one<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
}

impl Ports {
    /// Creates a port table connected to the process's standard streams
    pub fn new() -> Ports {
        Self::with_streams(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    pub fn with_streams(
        stdin: Box<dyn BufRead>,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Ports {
        Ports {
            table: vec![
                Some(Port::Input(stdin)),
                Some(Port::Output(stdout)),
                Some(Port::Output(stderr)),
            ],
        }
    }

    pub fn replace_stdin(&mut self, stdin: Box<dyn BufRead>) {
        self.table[STDIN_FD] = Some(Port::Input(stdin));
    }

    pub fn replace_stdout(&mut self, stdout: Box<dyn Write>) {
        self.table[STDOUT_FD] = Some(Port::Output(stdout));
    }

    pub fn replace_stderr(&mut self, stderr: Box<dyn Write>) {
        self.table[STDERR_FD] = Some(Port::Output(stderr));
    }

    pub fn open(&mut self, path: &Path, mode: OpenMode) -> io::Result<Fd> {
        let mut options = fs::OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true),
            OpenMode::ReadWrite => options.read(true).write(true).create(true),
        };

        let port = Some(Port::File(options.open(path)?));

        let fd = match self.table.iter().skip(3).position(Option::is_none) {
            Some(free) => {
                let fd = free + 3;
                self.table[fd] = port;
                fd
            }
            None => {
                self.table.push(port);
                self.table.len() - 1
            }
        };

        debug!(path = %path.display(), fd, ?mode, "opened port");
        Ok(fd)
    }

    /// Closes a file port
    ///
    /// The standard streams can't be closed.
    pub fn close(&mut self, fd: Fd) -> io::Result<()> {
        if fd <= STDERR_FD {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot close a standard stream",
            ));
        }

        match self.table.get_mut(fd).and_then(Option::take) {
            Some(Port::File(mut file)) => {
                file.flush()?;
                debug!(fd, "closed port");
                Ok(())
            }
            Some(_) | None => Err(closed_port()),
        }
    }

    /// Reads a single byte, returning `None` at end of input
    pub fn read_byte(&mut self, fd: Fd) -> io::Result<Option<u8>> {
        match self.table.get_mut(fd) {
            Some(Some(Port::Input(reader))) => read_one(reader.as_mut()),
            Some(Some(Port::File(file))) => read_one(file),
            Some(Some(Port::Output(_))) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "port is not readable",
            )),
            Some(None) | None => Err(closed_port()),
        }
    }

    /// Writes and flushes the passed bytes
    pub fn write_bytes(&mut self, fd: Fd, bytes: &[u8]) -> io::Result<()> {
        let writer: &mut dyn Write = match self.table.get_mut(fd) {
            Some(Some(Port::Output(writer))) => writer.as_mut(),
            Some(Some(Port::File(file))) => file,
            Some(Some(Port::Input(_))) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "port is not writable",
                ))
            }
            Some(None) | None => return Err(closed_port()),
        };

        writer.write_all(bytes)?;
        writer.flush()
    }
}

impl Default for Ports {
    fn default() -> Ports {
        Ports::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn null_ports() -> Ports {
        Ports::with_streams(
            Box::new(Cursor::new(b"hi".to_vec())),
            Box::new(io::sink()),
            Box::new(io::sink()),
        )
    }

    #[test]
    fn standard_streams() {
        let mut ports = null_ports();

        assert_eq!(Some(b'h'), ports.read_byte(STDIN_FD).unwrap());
        assert_eq!(Some(b'i'), ports.read_byte(STDIN_FD).unwrap());
        assert_eq!(None, ports.read_byte(STDIN_FD).unwrap());

        ports.write_bytes(STDOUT_FD, b"out").unwrap();
        assert!(ports.read_byte(STDOUT_FD).is_err());
        assert!(ports.write_bytes(STDIN_FD, b"in").is_err());
        assert!(ports.close(STDOUT_FD).is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("port.txt");
        let mut ports = null_ports();

        let out_fd = ports.open(&path, OpenMode::Write).unwrap();
        assert_eq!(3, out_fd);
        ports.write_bytes(out_fd, b"ok").unwrap();
        ports.close(out_fd).unwrap();
        assert!(ports.write_bytes(out_fd, b"!").is_err());

        // Closed descriptors are reused
        let in_fd = ports.open(&path, OpenMode::Read).unwrap();
        assert_eq!(3, in_fd);
        assert_eq!(Some(b'o'), ports.read_byte(in_fd).unwrap());
        assert_eq!(Some(b'k'), ports.read_byte(in_fd).unwrap());
        assert_eq!(None, ports.read_byte(in_fd).unwrap());
        ports.close(in_fd).unwrap();
    }

    #[test]
    fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut ports = null_ports();

        assert!(ports
            .open(&dir.path().join("missing"), OpenMode::Read)
            .is_err());
        assert_eq!(None, OpenMode::from_mode_char(b'x'));

        let created_path = dir.path().join("created");
        let fd = ports.open(&created_path, OpenMode::ReadWrite).unwrap();
        assert_eq!(None, ports.read_byte(fd).unwrap());
        ports.write_bytes(fd, b"new").unwrap();
        ports.close(fd).unwrap();

        assert_eq!(b"new".to_vec(), fs::read(&created_path).unwrap());
    }

    #[test]
    fn write_mode_keeps_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.txt");
        fs::write(&path, b"abc").unwrap();

        let mut ports = null_ports();
        let fd = ports.open(&path, OpenMode::Write).unwrap();
        ports.write_bytes(fd, b"X").unwrap();
        ports.close(fd).unwrap();

        assert_eq!(b"Xbc".to_vec(), fs::read(&path).unwrap());
    }

    #[test]
    fn interleaved_read_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.txt");
        fs::write(&path, b"abc").unwrap();

        let mut ports = null_ports();
        let fd = ports.open(&path, OpenMode::ReadWrite).unwrap();

        // The write lands directly after the byte that was read
        assert_eq!(Some(b'a'), ports.read_byte(fd).unwrap());
        ports.write_bytes(fd, b"X").unwrap();
        assert_eq!(Some(b'c'), ports.read_byte(fd).unwrap());
        assert_eq!(None, ports.read_byte(fd).unwrap());
        ports.close(fd).unwrap();

        assert_eq!(b"aXc".to_vec(), fs::read(&path).unwrap());
    }
}
