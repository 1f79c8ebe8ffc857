// Two-pass streaming decryption: round trip, tamper detection in both passes,
// ranged output, forward-only sources.

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use std::sync::{Arc, Mutex};

    use proptest::prelude::*;
    use rangeseal_core::constants::CONTAINER_HEADER_LEN;
    use rangeseal_core::container::locate;
    use rangeseal_core::crypto::{derive_keys, IntegrityError};
    use rangeseal_core::range::ByteSpan;
    use rangeseal_core::source::{ByteSource, MemorySource, SourceHandle};
    use rangeseal_core::stream::{seal, seal_bytes, seal_with, StreamingDecryptor};
    use rangeseal_core::telemetry::TelemetryCounters;
    use rangeseal_core::types::{StreamError, StreamResult};

    const SECRET: &[u8] = b"correct horse battery staple";

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 256) as u8).collect()
    }

    fn sealed(plaintext: &[u8], chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        seal(&mut &plaintext[..], &mut out, SECRET, chunk).unwrap();
        out
    }

    fn decrypt_all(source: &dyn ByteSource, chunk: usize, span: Option<ByteSpan>) -> StreamResult<Vec<u8>> {
        let layout = locate(source)?;
        let mut dec = StreamingDecryptor::new(layout, SECRET, chunk)?;
        let mut out = Vec::new();
        let mut counters = TelemetryCounters::default();
        dec.run(source, span, &mut out, &mut counters)?;
        Ok(out)
    }

    /// Source whose bytes can be changed between opens.
    struct MutableSource {
        data: Arc<Mutex<Vec<u8>>>,
        seekable: bool,
    }

    impl ByteSource for MutableSource {
        fn id(&self) -> &str {
            "mem://mutable"
        }
        fn size(&self) -> u64 {
            self.data.lock().unwrap().len() as u64
        }
        fn is_seekable(&self) -> bool {
            self.seekable
        }
        fn open(&self) -> StreamResult<SourceHandle> {
            let cursor = Cursor::new(self.data.lock().unwrap().clone());
            Ok(if self.seekable {
                SourceHandle::seekable(Box::new(cursor))
            } else {
                SourceHandle::forward(Box::new(cursor) as Box<dyn Read + Send>)
            })
        }
    }

    #[test]
    fn round_trip_whole() {
        let plaintext = pattern(5_000);
        let container = sealed(&plaintext, 1024);
        let out = decrypt_all(&MemorySource::new("mem://c", container), 1024, None).unwrap();
        assert_eq!(out, plaintext);
    }

    #[test]
    fn decrypt_chunking_is_independent_of_seal_chunking() {
        let plaintext = pattern(10_007);
        let container = sealed(&plaintext, 4096);
        for chunk in [16, 48, 1024, 65_536] {
            let out = decrypt_all(&MemorySource::new("mem://c", container.clone()), chunk, None).unwrap();
            assert_eq!(out, plaintext, "chunk {chunk}");
        }
    }

    #[test]
    fn seal_bytes_round_trip_forward_only() {
        let plaintext = pattern(70_000);
        let container = seal_bytes(&plaintext, SECRET).unwrap();
        let source = MemorySource::new("mem://c", container).forward_only().with_max_read(1000);
        assert_eq!(decrypt_all(&source, 4096, None).unwrap(), plaintext);
    }

    #[test]
    fn empty_plaintext() {
        let container = sealed(&[], 64);
        assert!(decrypt_all(&MemorySource::new("mem://e", container), 64, None).unwrap().is_empty());
    }

    #[test]
    fn fixed_salt_and_iv_are_deterministic() {
        let plaintext = pattern(300);
        let seal_once = || {
            let mut out = Vec::new();
            seal_with(&mut &plaintext[..], &mut out, SECRET, [3; 32], [4; 16], 64).unwrap();
            out
        };
        assert_eq!(seal_once(), seal_once());
    }

    #[test]
    fn ranged_output_is_byte_exact() {
        let plaintext = pattern(4_000);
        let container = sealed(&plaintext, 256);
        for (start, end) in [(0, 0), (100, 355), (256, 511), (1_000, 1_999), (3_990, 3_999)] {
            for source in [
                MemorySource::new("mem://s", container.clone()),
                MemorySource::new("mem://f", container.clone()).forward_only(),
            ] {
                let out = decrypt_all(&source, 256, Some(ByteSpan::new(start, end))).unwrap();
                assert_eq!(out, &plaintext[start as usize..=end as usize], "{start}-{end}");
            }
        }
    }

    #[test]
    fn flipped_bit_fails_pass_one_with_no_output() {
        let plaintext = pattern(2_000);
        let container = sealed(&plaintext, 128);

        for offset in [CONTAINER_HEADER_LEN, CONTAINER_HEADER_LEN + 999, container.len() - 33] {
            let mut tampered = container.clone();
            tampered[offset] ^= 0x01;
            let source = MemorySource::new("mem://t", tampered);

            let layout = locate(&source).unwrap();
            let mut dec = StreamingDecryptor::new(layout, SECRET, 128).unwrap();
            let mut out = Vec::new();
            let mut counters = TelemetryCounters::default();
            let err = dec.run(&source, None, &mut out, &mut counters).unwrap_err();

            assert!(matches!(err, StreamError::Integrity(IntegrityError::FinalMacMismatch)), "{err}");
            assert!(out.is_empty());
            assert_eq!(counters.bytes_emitted, 0);
        }
    }

    #[test]
    fn flipped_mac_byte_fails_pass_one() {
        let mut container = sealed(&pattern(500), 64);
        let last = container.len() - 1;
        container[last] ^= 0x80;
        let err = decrypt_all(&MemorySource::new("mem://t", container.clone()), 64, None).unwrap_err();
        assert!(matches!(err, StreamError::Integrity(IntegrityError::FinalMacMismatch)));

        let forward = MemorySource::new("mem://t", container).forward_only();
        let err = decrypt_all(&forward, 64, None).unwrap_err();
        assert!(matches!(err, StreamError::Integrity(IntegrityError::FinalMacMismatch)));
    }

    #[test]
    fn wrong_secret_fails_pass_one() {
        let container = sealed(&pattern(500), 64);
        let source = MemorySource::new("mem://c", container);
        let layout = locate(&source).unwrap();
        let mut dec = StreamingDecryptor::new(layout, b"not the secret", 64).unwrap();
        let err = dec.run(&source, None, &mut Vec::new(), &mut TelemetryCounters::default()).unwrap_err();
        assert!(matches!(err, StreamError::Integrity(IntegrityError::FinalMacMismatch)));
    }

    #[test]
    fn empty_secret_is_environment_error() {
        let container = sealed(&pattern(10), 64);
        let layout = locate(&MemorySource::new("mem://c", container)).unwrap();
        let err = StreamingDecryptor::new(layout, b"", 64).unwrap_err();
        assert!(matches!(err, StreamError::Environment(_)));
    }

    #[test]
    fn unaligned_or_zero_chunk_size_is_rejected() {
        let container = sealed(&pattern(1_000), 64);
        let source = MemorySource::new("mem://c", container);

        for chunk in [0, 100, 15] {
            let layout = locate(&source).unwrap();
            let err = StreamingDecryptor::new(layout, SECRET, chunk).err().unwrap();
            assert!(matches!(err, StreamError::Config(_)), "chunk {chunk}: {err}");
        }

        let layout = locate(&source).unwrap();
        let keys = derive_keys(SECRET, &layout.header.salt).unwrap();
        assert!(matches!(StreamingDecryptor::with_keys(layout, keys, 100), Err(StreamError::Config(_))));
    }

    #[test]
    fn change_between_passes_fails_at_first_affected_chunk() {
        let plaintext = pattern(1_000);
        let container = sealed(&plaintext, 64);

        for seekable in [true, false] {
            let data = Arc::new(Mutex::new(container.clone()));
            let source = MutableSource { data: data.clone(), seekable };

            let layout = locate(&source).unwrap();
            let mut dec = StreamingDecryptor::new(layout, SECRET, 64).unwrap();
            let mut counters = TelemetryCounters::default();
            let ledger = dec.verify(&source, &mut counters).unwrap();
            assert_eq!(ledger.len(), 16);

            // Ciphertext offset 300 lives in chunk 4.
            data.lock().unwrap()[CONTAINER_HEADER_LEN + 300] ^= 0x04;

            let mut out = Vec::new();
            let err = dec.decrypt(&source, ledger, None, &mut out, &mut counters).unwrap_err();

            assert!(matches!(err, StreamError::Integrity(IntegrityError::LedgerMismatch { chunk: 4 })), "{err}");
            assert_eq!(out, &plaintext[..256]);
        }
    }

    #[test]
    fn truncated_forward_stream_is_detected() {
        // Size claims more than the stream delivers.
        struct Lying(Vec<u8>);
        impl ByteSource for Lying {
            fn id(&self) -> &str {
                "mem://lying"
            }
            fn size(&self) -> u64 {
                self.0.len() as u64 + 100
            }
            fn is_seekable(&self) -> bool {
                false
            }
            fn open(&self) -> StreamResult<SourceHandle> {
                Ok(SourceHandle::forward(Box::new(Cursor::new(self.0.clone()))))
            }
        }

        let source = Lying(sealed(&pattern(400), 64));
        let err = decrypt_all(&source, 64, None).unwrap_err();
        assert!(matches!(err, StreamError::Integrity(IntegrityError::Truncated { .. })), "{err}");
    }

    #[test]
    fn span_past_plaintext_is_rejected() {
        let container = sealed(&pattern(100), 64);
        let err = decrypt_all(&MemorySource::new("mem://c", container), 64, Some(ByteSpan::new(50, 100)))
            .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn pass_two_counters() {
        let container = sealed(&pattern(1_000), 64);
        let source = MemorySource::new("mem://c", container);
        let layout = locate(&source).unwrap();
        let mut dec = StreamingDecryptor::new(layout, SECRET, 64).unwrap();
        assert_eq!(dec.chunk_count(), 16);

        let mut counters = TelemetryCounters::default();
        let n = dec.run(&source, Some(ByteSpan::new(200, 299)), &mut Vec::new(), &mut counters).unwrap();

        assert_eq!(n, 100);
        assert_eq!(counters.chunks_verified, 16);
        // Chunks 0..=4 re-verified, 3 and 4 decrypted.
        assert_eq!(counters.chunks_reverified, 5);
        assert_eq!(counters.chunks_decrypted, 2);
        assert_eq!(counters.bytes_emitted, 100);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_any_bit_flip_in_ciphertext_is_caught(len in 1usize..2_000, pos in any::<usize>(), bit in 0u8..8) {
            let container = sealed(&pattern(len), 128);
            let mut tampered = container;
            let idx = CONTAINER_HEADER_LEN + pos % len;
            tampered[idx] ^= 1 << bit;

            let err = decrypt_all(&MemorySource::new("mem://p", tampered), 128, None).unwrap_err();
            prop_assert!(matches!(err, StreamError::Integrity(IntegrityError::FinalMacMismatch)));
        }
    }
}
