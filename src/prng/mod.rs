//! EIP-93 pseudo-random number generator.
//!
//! - [`completion`] - Completion signal shared with the result interrupt
//! - [`descriptor`] - Command descriptor and SA record layouts
//! - [`engine`] - Command ring and the double-buffered front end
//!
//! # Example
//!
//! ```ignore
//! use ph_soc_dma::prng::{Eip93CommandRing, PrngCompletion, PrngEngine};
//! use ph_soc_dma::PrngConfig;
//!
//! static DONE: PrngCompletion = PrngCompletion::new();
//!
//! let mut ring: Eip93CommandRing<_, 4> = Eip93CommandRing::new(regs);
//! ring.setup();
//! let mut prng = PrngEngine::new(ring, &DONE, PrngConfig::new());
//! prng.init(&mut delay)?;
//!
//! let mut seed = [0u8; 32];
//! prng.generate(&mut seed, &mut delay)?;
//!
//! // result interrupt
//! DONE.signal(err_code);
//! ```

pub mod completion;
pub mod descriptor;
pub mod engine;

pub use completion::{BufferState, PrngCompletion};
pub use descriptor::{CommandDescriptor, PrngMode, SaRecord};
pub use engine::{Eip93CommandRing, PacketEngine, PrngEngine};
